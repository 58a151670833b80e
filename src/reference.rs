//! `$ref` string classification and normalization.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Default scheme used when none is configured.
pub const DEFAULT_SCHEME: &str = "forge";

/// Default extension of the per-module output file a scheme reference
/// rewrites to.
pub const DEFAULT_EXTENSION: &str = "openapi.yaml";

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<scheme>[a-zA-Z][a-zA-Z0-9-]*)://(?P<module>[a-zA-Z0-9_-]+)/(?P<resource>[a-zA-Z0-9_-]+)/v(?P<version>\d+)(?:#(?P<fragment>.*))?$",
        )
        .expect("scheme reference pattern is valid")
    })
}

/// The active reference scheme.
///
/// References qualified with this scheme are rewritten to point at the
/// module's output file, `./{module}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    pub name: String,
    pub extension: String,
}

impl Scheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Set the output-file extension (without the leading dot).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME)
    }
}

/// Identity of a document: `scheme://module/resource/vVERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub scheme: String,
    pub module: String,
    pub resource: String,
    pub version: u64,
}

impl Identity {
    pub fn new(
        scheme: impl Into<String>,
        module: impl Into<String>,
        resource: impl Into<String>,
        version: u64,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            module: module.into(),
            resource: resource.into(),
            version,
        }
    }

    /// Parse an identity URI. A fragment is not allowed.
    pub fn parse(uri: &str) -> Option<Self> {
        match Reference::parse(uri).kind {
            ReferenceKind::Scheme {
                identity,
                fragment: None,
            } => Some(identity),
            _ => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}/v{}",
            self.scheme, self.module, self.resource, self.version
        )
    }
}

/// Classification of a reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Same document: `#...`.
    Local,
    /// Sibling file: `./file#...`.
    Relative,
    /// `scheme://module/resource/vN[#fragment]`.
    Scheme {
        identity: Identity,
        fragment: Option<String>,
    },
    /// Anything else (URLs, bare paths). Never rewritten.
    Other,
}

/// A parsed `$ref` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub raw: String,
    pub kind: ReferenceKind,
}

impl Reference {
    pub fn parse(raw: &str) -> Self {
        let kind = if raw.starts_with('#') {
            ReferenceKind::Local
        } else if raw.starts_with("./") {
            ReferenceKind::Relative
        } else if let Some(caps) = scheme_regex().captures(raw) {
            match caps["version"].parse::<u64>() {
                Ok(version) => ReferenceKind::Scheme {
                    identity: Identity::new(
                        &caps["scheme"],
                        &caps["module"],
                        &caps["resource"],
                        version,
                    ),
                    fragment: caps.name("fragment").map(|m| m.as_str().to_string()),
                },
                // version digits overflowing u64 are not an identity
                Err(_) => ReferenceKind::Other,
            }
        } else {
            ReferenceKind::Other
        };
        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    pub fn is_local(&self) -> bool {
        self.kind == ReferenceKind::Local
    }

    pub fn is_relative(&self) -> bool {
        self.kind == ReferenceKind::Relative
    }

    /// The part after `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.raw.find('#').map(|idx| &self.raw[idx + 1..])
    }

    /// Rewrite this reference for the merged output of `scheme`.
    ///
    /// - local references are unchanged
    /// - relative references collapse to their `#fragment`; without a
    ///   fragment they pass through unchanged
    /// - references under `scheme` become `./{module}.{ext}#{fragment}`
    /// - everything else is unchanged
    pub fn normalize(&self, scheme: &Scheme) -> String {
        match &self.kind {
            ReferenceKind::Local | ReferenceKind::Other => self.raw.clone(),
            ReferenceKind::Relative => match self.raw.find('#') {
                Some(idx) => self.raw[idx..].to_string(),
                None => {
                    tracing::warn!(reference = %self.raw, "relative $ref without a fragment");
                    self.raw.clone()
                }
            },
            ReferenceKind::Scheme { identity, fragment } if identity.scheme == scheme.name => {
                let base = format!("./{}.{}", identity.module, scheme.extension);
                match fragment {
                    Some(fragment) if !fragment.is_empty() => format!("{}#{}", base, fragment),
                    _ => base,
                }
            }
            ReferenceKind::Scheme { .. } => self.raw.clone(),
        }
    }
}
