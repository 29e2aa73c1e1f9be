//! Source identity checking
//!
//! Sources are compared pairwise by position. When both sides carry the
//! same identity representation the comparison is direct; when the
//! representations differ (one inline hash, one content-store reference)
//! the reference side is resolved to a `(basename, hash)` pair first. This
//! is the mechanism that stops a worker from executing stale or tampered
//! code.

use workq_core::{ContentId, Error, ResolvedSource, Result, SourceEntry, SourceIdentity};

/// Content-addressable store that resolves reference ids to stored
/// filenames and hashes.
pub trait ContentStore: Send + Sync {
    /// Resolve a reference id to the stored `(filename, hash)` pair.
    fn resolve(&self, id: &ContentId) -> Result<ResolvedSource>;
}

/// `(basename, identity)` view of one side of a comparison.
fn direct_key(entry: &SourceEntry) -> (String, String) {
    let identity = match &entry.identity {
        SourceIdentity::Hash(h) => h.clone(),
        SourceIdentity::ContentRef(id) => id.to_string(),
    };
    (entry.basename().to_string(), identity)
}

/// `(basename, hash)` after resolving a reference through the store.
fn resolved_key(entry: &SourceEntry, store: &dyn ContentStore) -> Result<(String, String)> {
    match &entry.identity {
        SourceIdentity::Hash(h) => Ok((entry.basename().to_string(), h.clone())),
        SourceIdentity::ContentRef(id) => {
            let resolved = store.resolve(id)?;
            Ok((resolved.basename().to_string(), resolved.hash))
        }
    }
}

/// Check that each loaded source matches the run's recorded source.
///
/// Pairwise by position; comparison stops at the shorter list. Same
/// representation compares directly; mixed representations resolve the
/// reference side through `store`.
pub fn check_sources(
    loaded: &[SourceEntry],
    run: &[SourceEntry],
    store: &dyn ContentStore,
) -> Result<()> {
    for (loaded_entry, run_entry) in loaded.iter().zip(run.iter()) {
        let same_repr = matches!(
            (&loaded_entry.identity, &run_entry.identity),
            (SourceIdentity::Hash(_), SourceIdentity::Hash(_))
                | (SourceIdentity::ContentRef(_), SourceIdentity::ContentRef(_))
        );

        let (expected, found) = if same_repr {
            (direct_key(loaded_entry), direct_key(run_entry))
        } else {
            (
                resolved_key(loaded_entry, store)?,
                resolved_key(run_entry, store)?,
            )
        };

        if expected != found {
            return Err(Error::SourceMismatch { expected, found });
        }
    }
    Ok(())
}
