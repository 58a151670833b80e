//! Workspace discovery and the reference registry.
//!
//! A workspace is a directory holding a `jsmn-forge.yaml` (or `.jsmnForge.yml`,
//! `JsmnForge.yaml`, ...) config that lists the module's resources:
//!
//! ```yaml
//! resources:
//!   - name: common
//!     version: 0
//!     openapi: [common.openapi.yaml]
//! ```
//!
//! The module name is the directory name up to its first `.`, so every
//! resource document gets the identity `scheme://module/resource/vVERSION`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::WorkspaceError;
use crate::loader::load_document;
use crate::location::Location;
use crate::reference::{Identity, Reference, ReferenceKind, Scheme};
use crate::validator::validate_config;

/// Key holding a document's identity.
pub const ID_KEY: &str = "$id";

fn config_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\.?(jsmnForge|JsmnForge|jsmn-forge)\.ya?ml$")
            .expect("config file pattern is valid")
    })
}

/// Whether `name` is a recognised workspace config file name.
pub fn is_config_file(name: &str) -> bool {
    config_regex().is_match(name)
}

/// One entry of a config's `resources` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub version: u64,
    #[serde(default)]
    pub openapi: Vec<PathBuf>,
    #[serde(default)]
    pub asyncapi: Vec<PathBuf>,
    #[serde(default, rename = "if")]
    pub conditions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Config {
    resources: Vec<ResourceConfig>,
}

/// A parsed workspace directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub module: String,
    pub root: PathBuf,
    pub config: PathBuf,
    /// Resource file paths are already joined onto `root`.
    pub resources: Vec<ResourceConfig>,
}

/// Find the config file in `dir`, `Ok(None)` when there is none.
///
/// When several names match, the lexically first wins.
pub fn discover(dir: &Path) -> Result<Option<PathBuf>, WorkspaceError> {
    let read_dir = |source| WorkspaceError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut found: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir)? {
        let entry = entry.map_err(read_dir)?;
        let matches = entry.file_name().to_str().is_some_and(is_config_file);
        if matches && entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found.into_iter().next())
}

/// Discover, validate and parse the workspace at `dir`.
///
/// # Errors
///
/// Returns `WorkspaceError::MissingConfig` if `dir` has no config file,
/// `WorkspaceError::InvalidConfig` if it doesn't match the config shape.
pub fn load_workspace(dir: &Path) -> Result<Workspace, WorkspaceError> {
    let read_dir = |source| WorkspaceError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    // the module is named after the directory as given, not its symlink target
    let named = std::env::current_dir().map_err(read_dir)?.join(dir);
    let root = dir.canonicalize().map_err(read_dir)?;
    let config = discover(&root)?.ok_or_else(|| WorkspaceError::MissingConfig {
        path: dir.to_path_buf(),
    })?;

    let doc = load_document(&config)?;
    validate_config(&doc).map_err(|errors| WorkspaceError::InvalidConfig {
        path: config.clone(),
        errors,
    })?;
    let parsed: Config =
        serde_json::from_value(doc).map_err(|source| WorkspaceError::MalformedConfig {
            path: config.clone(),
            source,
        })?;

    let module = named
        .file_name()
        .or_else(|| root.file_name())
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .unwrap_or_default()
        .to_string();

    let resources = parsed
        .resources
        .into_iter()
        .map(|mut res| {
            res.openapi = res.openapi.iter().map(|p| root.join(p)).collect();
            res.asyncapi = res.asyncapi.iter().map(|p| root.join(p)).collect();
            res
        })
        .collect();

    debug!(module = %module, config = %config.display(), "loaded workspace");
    Ok(Workspace {
        module,
        root,
        config,
        resources,
    })
}

/// A registered document and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub path: PathBuf,
    pub document: Value,
}

/// Documents keyed by identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: BTreeMap<Identity, Entry>,
}

impl Registry {
    pub fn get(&self, identity: &Identity) -> Option<&Value> {
        self.entries.get(identity).map(|e| &e.document)
    }

    /// Resolve a `scheme://module/resource/vN[#/pointer]` reference.
    pub fn lookup(&self, reference: &str) -> Option<&Value> {
        let ReferenceKind::Scheme { identity, fragment } = Reference::parse(reference).kind else {
            return None;
        };
        let document = self.get(&identity)?;
        match fragment {
            Some(pointer) => Location::from_pointer(&pointer).resolve(document),
            None => Some(document),
        }
    }

    pub fn entry(&self, identity: &Identity) -> Option<&Entry> {
        self.entries.get(identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Entry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of [`build_registry`].
#[derive(Debug, Default)]
pub struct RegistryResult {
    pub registry: Registry,
    pub errors: Vec<WorkspaceError>,
}

/// Read every OpenAPI document of every workspace in `dirs`.
///
/// A document without `$id` is assigned `scheme://module/resource/vN`. Errors
/// are collected per workspace and per document; everything else is still
/// registered.
pub fn build_registry<P: AsRef<Path>>(scheme: &Scheme, dirs: &[P]) -> RegistryResult {
    let mut result = RegistryResult::default();

    for dir in dirs {
        let workspace = match load_workspace(dir.as_ref()) {
            Ok(workspace) => workspace,
            Err(err) => {
                warn!(dir = %dir.as_ref().display(), error = %err, "skipping workspace");
                result.errors.push(err);
                continue;
            }
        };
        for res in &workspace.resources {
            let default_id = Identity::new(
                scheme.name.as_str(),
                workspace.module.as_str(),
                res.name.as_str(),
                res.version,
            );
            for path in &res.openapi {
                if let Err(err) = register(&mut result.registry, path, &default_id) {
                    warn!(path = %path.display(), error = %err, "skipping document");
                    result.errors.push(err);
                }
            }
        }
    }

    result
}

fn register(
    registry: &mut Registry,
    path: &Path,
    default_id: &Identity,
) -> Result<(), WorkspaceError> {
    let mut document = load_document(path)?;
    let Some(map) = document.as_object_mut() else {
        return Err(WorkspaceError::NotAMapping {
            path: path.to_path_buf(),
        });
    };

    let identity = match map.get(ID_KEY) {
        None => {
            map.insert(ID_KEY.to_string(), Value::String(default_id.to_string()));
            default_id.clone()
        }
        Some(Value::String(id)) => {
            Identity::parse(id).ok_or_else(|| WorkspaceError::InvalidIdentity {
                path: path.to_path_buf(),
                id: id.clone(),
            })?
        }
        Some(other) => {
            return Err(WorkspaceError::InvalidIdentity {
                path: path.to_path_buf(),
                id: other.to_string(),
            })
        }
    };

    if registry.entries.contains_key(&identity) {
        return Err(WorkspaceError::DuplicateIdentity {
            path: path.to_path_buf(),
            id: identity.to_string(),
        });
    }
    debug!(id = %identity, path = %path.display(), "registered document");
    registry.entries.insert(
        identity,
        Entry {
            path: path.to_path_buf(),
            document,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn config_file_names() {
        for name in [
            "jsmn-forge.yaml",
            "jsmnForge.yml",
            ".JsmnForge.yaml",
            ".jsmn-forge.yml",
        ] {
            assert!(is_config_file(name), "{name}");
        }
        for name in ["jsmn_forge.yaml", "jsmn-forge.json", "xjsmnForge.yaml", "jsmn-forge.yaml.bak"] {
            assert!(!is_config_file(name), "{name}");
        }
    }

    #[test]
    fn discover_finds_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(discover(dir.path()).unwrap(), None);

        fs::write(dir.path().join("jsmnForge.yml"), "resources: []").unwrap();
        fs::write(dir.path().join("other.yaml"), "a: 1").unwrap();
        assert_eq!(
            discover(dir.path()).unwrap(),
            Some(dir.path().join("jsmnForge.yml"))
        );
    }

    #[test]
    fn module_name_stops_at_first_dot() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("sdk.v2.api");
        fs::create_dir(&root).unwrap();
        fs::write(
            root.join("jsmn-forge.yaml"),
            "resources:\n  - name: common\n    version: 1\n    openapi: [common.yaml]\n    if: [feature]",
        )
        .unwrap();

        let ws = load_workspace(&root).unwrap();
        assert_eq!(ws.module, "sdk");
        assert_eq!(ws.resources[0].openapi, [ws.root.join("common.yaml")]);
        assert_eq!(ws.resources[0].conditions, ["feature"]);
        assert!(ws.resources[0].asyncapi.is_empty());
    }

    #[test]
    fn missing_config() {
        let dir = TempDir::new().unwrap();
        let err = load_workspace(dir.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::MissingConfig { .. }));
    }

    #[test]
    fn invalid_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jsmn-forge.yaml"), "resources:\n  - name: a").unwrap();
        let err = load_workspace(dir.path()).unwrap_err();
        match err {
            WorkspaceError::InvalidConfig { errors, .. } => assert_eq!(errors.len(), 1),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn fractional_version_is_malformed() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("jsmn-forge.yaml"),
            "resources:\n  - name: a\n    version: 1.5",
        )
        .unwrap();
        let err = load_workspace(dir.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::MalformedConfig { .. }));
    }

    #[test]
    fn lookup_resolves_fragment() {
        let mut registry = Registry::default();
        let id = Identity::new("forge", "sdk", "common", 0);
        registry.entries.insert(
            id.clone(),
            Entry {
                path: PathBuf::from("common.yaml"),
                document: serde_json::json!({"components": {"schemas": {"A": {"type": "string"}}}}),
            },
        );
        assert_eq!(
            registry.lookup("forge://sdk/common/v0#/components/schemas/A"),
            Some(&serde_json::json!({"type": "string"}))
        );
        assert!(registry.lookup("forge://sdk/common/v0").is_some());
        assert!(registry.lookup("forge://sdk/common/v1").is_none());
        assert!(registry.lookup("forge://sdk/common/v0#/missing").is_none());
        assert!(registry.lookup("#/components").is_none());
        assert_eq!(registry.get(&id), registry.lookup("forge://sdk/common/v0"));
    }
}
