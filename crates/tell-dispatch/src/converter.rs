//! String-to-value converters and the built-in set.

use crate::error::ConversionError;
use crate::types::{Rest, TypeKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns one argument token into a `T`.
///
/// `token` is `None` when there is no input at all; each converter decides
/// through its [`NullPolicy`] whether that is an error or a default.
pub trait Converter<T: 'static>: Send + Sync {
    fn convert(&self, token: Option<&str>) -> Result<T, ConversionError>;

    /// The type this converter produces.
    fn target(&self) -> TypeKey {
        TypeKey::of::<T>()
    }
}

/// What a converter does with absent input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullPolicy<T> {
    /// Absent input fails with [`ConversionError::MissingInput`].
    Forbid,
    /// Absent input converts to this value.
    Default(T),
}

impl<T> Default for NullPolicy<T> {
    fn default() -> Self {
        Self::Forbid
    }
}

impl<T: Clone> NullPolicy<T> {
    pub fn resolve(&self) -> Result<T, ConversionError> {
        match self {
            Self::Forbid => Err(ConversionError::MissingInput),
            Self::Default(value) => Ok(value.clone()),
        }
    }
}

type ParseFn<T> = dyn Fn(&str) -> Result<T, ConversionError> + Send + Sync;

/// Converter built from a parsing closure.
///
/// ```ignore
/// let user = FnConverter::new(|handle| Ok(User::new(handle)));
/// ```
pub struct FnConverter<T> {
    parse: Box<ParseFn<T>>,
    null: NullPolicy<T>,
}

impl<T> FnConverter<T> {
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        Self {
            parse: Box::new(parse),
            null: NullPolicy::Forbid,
        }
    }

    /// Convert absent input to `value` instead of failing.
    pub fn or_default(mut self, value: T) -> Self {
        self.null = NullPolicy::Default(value);
        self
    }
}

impl<T: Clone + Send + Sync + 'static> Converter<T> for FnConverter<T> {
    fn convert(&self, token: Option<&str>) -> Result<T, ConversionError> {
        match token {
            Some(token) => (self.parse)(token),
            None => self.null.resolve(),
        }
    }
}

/// Base-10 `i32`. Rejects non-numeric text and values out of range.
#[derive(Debug, Clone, Default)]
pub struct IntegerConverter {
    null: NullPolicy<i32>,
}

impl IntegerConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(value: i32) -> Self {
        Self {
            null: NullPolicy::Default(value),
        }
    }
}

impl Converter<i32> for IntegerConverter {
    fn convert(&self, token: Option<&str>) -> Result<i32, ConversionError> {
        let Some(token) = token else {
            return self.null.resolve();
        };
        token
            .parse::<i32>()
            .map_err(|_| ConversionError::invalid("integer", token))
    }
}

/// Passes the token through unchanged.
#[derive(Debug, Clone, Default)]
pub struct StringConverter {
    null: NullPolicy<String>,
}

impl StringConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(value: impl Into<String>) -> Self {
        Self {
            null: NullPolicy::Default(value.into()),
        }
    }
}

impl Converter<String> for StringConverter {
    fn convert(&self, token: Option<&str>) -> Result<String, ConversionError> {
        match token {
            Some(token) => Ok(token.to_string()),
            None => self.null.resolve(),
        }
    }
}

/// Wraps captured text in [`Rest`]. Absent input becomes empty text.
///
/// Used by the dispatcher directly; it is never looked up in a registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestConverter;

impl Converter<Rest> for RestConverter {
    fn convert(&self, token: Option<&str>) -> Result<Rest, ConversionError> {
        Ok(Rest::new(token.unwrap_or_default()))
    }
}

/// Resolves names to domain entities. Lookups are case-insensitive.
pub trait NameLookup<T>: Send + Sync {
    fn lookup(&self, name: &str) -> Option<T>;
}

impl<T, L: NameLookup<T> + ?Sized> NameLookup<T> for Arc<L> {
    fn lookup(&self, name: &str) -> Option<T> {
        (**self).lookup(name)
    }
}

/// Thread-safe, case-insensitive name directory.
///
/// The original spelling of each name is kept for listings.
pub struct NameDirectory<T> {
    entries: RwLock<HashMap<String, (String, T)>>,
}

impl<T: Clone> NameDirectory<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register `entity` under `name`, returning whatever it replaced.
    pub fn insert(&self, name: &str, entity: T) -> Option<T> {
        self.entries
            .write()
            .insert(name.to_lowercase(), (name.to_string(), entity))
            .map(|(_, previous)| previous)
    }

    pub fn remove(&self, name: &str) -> Option<T> {
        self.entries
            .write()
            .remove(&name.to_lowercase())
            .map(|(_, entity)| entity)
    }

    pub fn get(&self, name: &str) -> Option<T> {
        self.entries
            .read()
            .get(&name.to_lowercase())
            .map(|(_, entity)| entity.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names in their original spelling, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .values()
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl<T: Clone> Default for NameDirectory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> NameLookup<T> for NameDirectory<T> {
    fn lookup(&self, name: &str) -> Option<T> {
        self.get(name)
    }
}

/// Converter backed by a [`NameLookup`]: makes any named domain entity
/// usable as a parameter type.
pub struct NameConverter<T, L> {
    names: L,
    null: NullPolicy<T>,
}

impl<T, L: NameLookup<T>> NameConverter<T, L> {
    pub fn new(names: L) -> Self {
        Self {
            names,
            null: NullPolicy::Forbid,
        }
    }

    pub fn or_default(mut self, value: T) -> Self {
        self.null = NullPolicy::Default(value);
        self
    }
}

impl<T, L> Converter<T> for NameConverter<T, L>
where
    T: Clone + Send + Sync + 'static,
    L: NameLookup<T>,
{
    fn convert(&self, token: Option<&str>) -> Result<T, ConversionError> {
        let Some(name) = token else {
            return self.null.resolve();
        };
        self.names
            .lookup(name)
            .ok_or_else(|| ConversionError::unknown_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Team(String);

    #[test]
    fn test_integer_converter() {
        let ints = IntegerConverter::new();
        assert_eq!(ints.convert(Some("5")), Ok(5));
        assert_eq!(ints.convert(Some("-12")), Ok(-12));
        assert_eq!(
            ints.convert(Some("notanumber")),
            Err(ConversionError::invalid("integer", "notanumber"))
        );
        assert_eq!(ints.convert(None), Err(ConversionError::MissingInput));
        assert!(ints.target().is::<i32>());
    }

    #[test]
    fn test_integer_converter_rejects_overflow() {
        let ints = IntegerConverter::new();
        assert!(ints.convert(Some("2147483647")).is_ok());
        assert_eq!(
            ints.convert(Some("2147483648")),
            Err(ConversionError::invalid("integer", "2147483648"))
        );
    }

    #[test]
    fn test_integer_converter_default() {
        let ints = IntegerConverter::with_default(1);
        assert_eq!(ints.convert(None), Ok(1));
        assert!(ints.convert(Some("one")).is_err());
    }

    #[test]
    fn test_string_converter() {
        let strings = StringConverter::new();
        assert_eq!(strings.convert(Some("Hello!")), Ok("Hello!".to_string()));
        assert_eq!(strings.convert(None), Err(ConversionError::MissingInput));
        assert_eq!(StringConverter::with_default("").convert(None), Ok(String::new()));
    }

    #[test]
    fn test_rest_converter_keeps_text() {
        let rest = RestConverter.convert(Some("a  b,\tc")).unwrap();
        assert_eq!(rest.as_str(), "a  b,\tc");
        assert_eq!(RestConverter.convert(None).unwrap(), Rest::default());
    }

    #[test]
    fn test_fn_converter() {
        let teams = FnConverter::new(|name: &str| {
            if name.starts_with('#') {
                Ok(Team(name[1..].to_string()))
            } else {
                Err(ConversionError::invalid("team", name))
            }
        });
        assert_eq!(teams.convert(Some("#blue")), Ok(Team("blue".into())));
        assert!(teams.convert(Some("blue")).is_err());
        assert_eq!(teams.convert(None), Err(ConversionError::MissingInput));

        let teams = teams.or_default(Team("none".into()));
        assert_eq!(teams.convert(None), Ok(Team("none".into())));
    }

    #[test]
    fn test_name_directory_is_case_insensitive() {
        let directory = NameDirectory::new();
        assert!(directory.insert("TestPlayer-XYZ", 1).is_none());
        assert_eq!(directory.get("testplayer-xyz"), Some(1));
        assert_eq!(directory.get("TESTPLAYER-XYZ"), Some(1));
        assert!(directory.contains("TestPlayer-xyz"));
        assert_eq!(directory.names(), vec!["TestPlayer-XYZ".to_string()]);

        assert_eq!(directory.insert("testplayer-XYZ", 2), Some(1));
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.remove("TESTPLAYER-xyz"), Some(2));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_name_converter() {
        let directory = Arc::new(NameDirectory::new());
        directory.insert("Blue", Team("Blue".into()));

        let teams = NameConverter::new(Arc::clone(&directory));
        assert_eq!(teams.convert(Some("blue")), Ok(Team("Blue".into())));
        assert_eq!(
            teams.convert(Some("red")),
            Err(ConversionError::unknown_name("red"))
        );
        assert_eq!(teams.convert(None), Err(ConversionError::MissingInput));
    }
}
