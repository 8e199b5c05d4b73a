//! Type identifiers and the capture-rest argument type.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Identifies the declared type of a handler parameter.
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// error messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Check whether this key identifies `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Type name without its module path (`Player` for `tourney_bot::roster::Player`).
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        let start = base.rfind("::").map(|i| i + 2).unwrap_or(0);
        &self.name[start..]
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Selects one of the two converter registries a dispatcher owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    /// Resolves the sender of a tell (parameter position 0).
    Identity,
    /// Resolves every other typed parameter.
    Argument,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::Identity => f.write_str("identity"),
            RegistryKind::Argument => f.write_str("argument"),
        }
    }
}

/// Unparsed remainder of a command line.
///
/// Declaring a `Rest` as the last handler parameter makes it capture
/// everything after the preceding arguments verbatim (outer whitespace
/// trimmed). It never passes through a registry converter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rest(pub String);

impl Rest {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Rest {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Rest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Rest {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Rest {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for Rest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
