// Flag synchronization between two registries
// Copies values by name from a source set into a target set that defines some of the
// same flags under a different registration.

use crate::flags::{FlagError, FlagSet};
use std::collections::BTreeSet;
use thiserror::Error;

/// Flag whose default in one registry is rejected by the other.
pub const LOG_BACKTRACE_AT: &str = "log_backtrace_at";

#[derive(Debug, Error)]
#[error("unable to sync flag: '{name}', value '{value}'")]
pub struct SyncError {
    pub name: String,
    pub value: String,
    #[source]
    pub source: FlagError,
}

/// Copies flag values and tolerates rejections for the names it ignores.
#[derive(Debug, Clone)]
pub struct FlagSync {
    ignored: BTreeSet<String>,
}

impl Default for FlagSync {
    fn default() -> Self {
        FlagSync::empty().ignoring(LOG_BACKTRACE_AT)
    }
}

impl FlagSync {
    pub fn new() -> Self {
        FlagSync::default()
    }

    /// No ignored names at all.
    pub fn empty() -> Self {
        FlagSync {
            ignored: BTreeSet::new(),
        }
    }

    pub fn ignoring(mut self, name: impl Into<String>) -> Self {
        self.ignored.insert(name.into());
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    /// Set every flag of `target` that `source` also defines to the source's value.
    ///
    /// Keeps going after a rejection and returns the last one; flags only in `source`
    /// are skipped.
    pub fn sync(&self, source: &FlagSet, target: &mut FlagSet) -> Result<(), SyncError> {
        let mut result = Ok(());

        for flag in source.iter() {
            if target.lookup(flag.name()).is_none() {
                continue;
            }

            let value = flag.value().render();
            match target.set(flag.name(), &value) {
                Ok(()) => {
                    tracing::trace!(flag = flag.name(), value = %value, "synced flag");
                }
                Err(err) if self.is_ignored(flag.name()) => {
                    tracing::debug!(flag = flag.name(), error = %err, "ignored flag sync mismatch");
                }
                Err(err) => {
                    result = Err(SyncError {
                        name: flag.name().to_string(),
                        value,
                        source: err,
                    });
                }
            }
        }

        result
    }
}

/// [`FlagSync::sync`] ignoring only [`LOG_BACKTRACE_AT`].
pub fn sync_flags(source: &FlagSet, target: &mut FlagSet) -> Result<(), SyncError> {
    FlagSync::default().sync(source, target)
}
