//! Struct descriptor IR: output of [`flatten`](crate::flatten), input to a
//! C code emitter.
//!
//! Wrapper structs are implied rather than spelled out:
//! - a [`CType`] dimension with `min != max` implies a variable-length
//!   wrapper with capacity `max`
//! - a [`Field`] with `required == false` implies an optional wrapper
//! - a [`FieldType::Union`] implies a tagged union wrapper

use serde::Serialize;

use crate::location::Location;

/// One array dimension, outermost first in [`CType::dims`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dim {
    pub min: u64,
    pub max: u64,
}

impl Dim {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Exactly `n` elements.
    pub fn fixed(n: u64) -> Self {
        Self { min: n, max: n }
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

/// Hashable C type identifier: a base type name plus array shape.
///
/// ```text
/// CType("uint32_t")                  uint32_t
/// CType("uint8_t", [Dim(32, 32)])    uint8_t[32]
/// CType("uint32_t", [Dim(0, 3)])     variable-length, capacity 3
/// CType("device_config")             struct device_config
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CType {
    pub name: String,
    pub dims: Vec<Dim>,
}

impl CType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dims: Vec::new(),
        }
    }

    pub fn with_dims(name: impl Into<String>, dims: Vec<Dim>) -> Self {
        Self {
            name: name.into(),
            dims,
        }
    }

    pub fn is_array(&self) -> bool {
        !self.dims.is_empty()
    }
}

/// Field type: a single type, or the variants of a tagged union.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldType {
    Single(CType),
    Union(Vec<CType>),
}

/// Struct member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub required: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ctype: CType, required: bool) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Single(ctype),
            required,
        }
    }

    /// The single type of this field, `None` for unions.
    pub fn ctype(&self) -> Option<&CType> {
        match &self.ty {
            FieldType::Single(ctype) => Some(ctype),
            FieldType::Union(_) => None,
        }
    }
}

/// Named struct definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Struct {
    pub ctype: CType,
    pub location: Location,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn name(&self) -> &str {
        &self.ctype.name
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
