//! Provenance verification
//!
//! Before a claimed run may execute, the worker must prove that the code it
//! loaded is the code the run was enqueued against. Three independent
//! checks, all pure functions over already-fetched data:
//!
//! 1. **Name**: the loaded experiment's name equals the run's recorded name.
//! 2. **Sources**: pairwise by position, each loaded source's identity
//!    matches the run's recorded identity, resolving content-store
//!    references where the representations differ.
//! 3. **Dependencies**: every dependency the run requires is satisfied by
//!    the loaded environment under the configured [`VersionPolicy`].
//!
//! None of these touch the registry; the only I/O seam is the
//! [`ContentStore`] used to resolve reference ids, injected as a trait.

mod sources;

pub use sources::{check_sources, ContentStore};

use std::collections::HashMap;
use workq_core::{Dependency, Error, ExperimentInfo, Result, Version};

/// How dependency versions must relate to what the run requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// Satisfied iff the name is present and the available version is
    /// greater than or equal to the required one.
    #[default]
    Newer,
    /// Satisfied iff the available version equals the required one exactly.
    Equal,
    /// Satisfied iff the name is present; the version is ignored.
    Exists,
}

/// Check that the loaded experiment name matches the run's recorded name.
pub fn check_name(loaded: &str, run: &str) -> Result<()> {
    if loaded == run {
        Ok(())
    } else {
        Err(Error::NameMismatch {
            expected: loaded.to_string(),
            found: run.to_string(),
        })
    }
}

/// Check that every dependency the run requires is satisfied by the loaded
/// environment under `policy`.
///
/// Both lists are `"name==version"` entries. The loaded list folds into a
/// name → version map; duplicate names keep the last entry.
pub fn check_dependencies(
    loaded: &[String],
    required: &[String],
    policy: VersionPolicy,
) -> Result<()> {
    let mut available: HashMap<String, Version> = HashMap::new();
    for dep in Dependency::parse_list(loaded)? {
        available.insert(dep.name, dep.version);
    }

    for dep in Dependency::parse_list(required)? {
        let found = available.get(&dep.name);
        let satisfied = match policy {
            VersionPolicy::Newer => found.is_some_and(|v| *v >= dep.version),
            VersionPolicy::Equal => found.is_some_and(|v| *v == dep.version),
            VersionPolicy::Exists => found.is_some(),
        };
        if !satisfied {
            return Err(Error::DependencyMismatch {
                name: dep.name,
                spec: found.cloned(),
                required: dep.version,
            });
        }
    }
    Ok(())
}

/// Run all three checks: name, then sources, then dependencies.
///
/// `loaded` is what the code on disk reports about itself; `run` is what
/// was recorded at enqueue time.
pub fn verify(
    loaded: &ExperimentInfo,
    run: &ExperimentInfo,
    store: &dyn ContentStore,
    policy: VersionPolicy,
) -> Result<()> {
    check_name(&loaded.name, &run.name)?;
    check_sources(&loaded.sources, &run.sources, store)?;
    check_dependencies(&loaded.dependencies, &run.dependencies, policy)?;
    tracing::debug!(experiment = %run.name, "provenance verified");
    Ok(())
}
