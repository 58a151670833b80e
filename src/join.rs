//! File-level join: load, normalize and merge a batch of documents.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::loader::load_document;
use crate::location::Location;
use crate::merge::{merge, MergeConflict};
use crate::node::Grammar;
use crate::normalize::normalize;
use crate::reference::Scheme;

/// A merge conflict tagged with the file whose content introduced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinConflict {
    pub file: PathBuf,
    pub location: Location,
    pub destination: Value,
    pub source: Value,
}

impl JoinConflict {
    fn new(file: &Path, conflict: MergeConflict) -> Self {
        Self {
            file: file.to_path_buf(),
            location: conflict.location,
            destination: conflict.destination,
            source: conflict.source,
        }
    }
}

/// Outcome of [`join`].
#[derive(Debug, Default)]
pub struct JoinResult {
    /// Merged document, `None` when no input could be loaded.
    pub value: Option<Value>,
    pub conflicts: Vec<JoinConflict>,
    /// One entry per input that failed to load.
    pub errors: Vec<LoadError>,
}

/// Normalize every file in `paths`, then fold-merge them in order.
///
/// Load failures are collected per file and never abort the batch. The first
/// loadable document seeds the result; conflicts name the later file that
/// disagreed with it.
pub fn join<P: AsRef<Path>>(paths: &[P], grammar: &Grammar, scheme: &Scheme) -> JoinResult {
    let mut result = JoinResult::default();

    for path in paths {
        let path = path.as_ref();
        let doc = match load_document(path) {
            Ok(doc) => normalize(&doc, grammar, scheme),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping document");
                result.errors.push(err);
                continue;
            }
        };
        debug!(path = %path.display(), "normalized document");

        result.value = Some(match result.value.take() {
            None => doc,
            Some(acc) => {
                let merged = merge(&acc, &doc, grammar);
                for conflict in merged.conflicts {
                    warn!(
                        path = %path.display(),
                        location = %conflict.location,
                        "merge conflict"
                    );
                    result.conflicts.push(JoinConflict::new(path, conflict));
                }
                debug!(path = %path.display(), "merged document");
                merged.value
            }
        });
    }

    result
}
