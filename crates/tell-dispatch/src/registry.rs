//! Type-keyed converter registry.

use crate::converter::Converter;
use crate::error::ConversionError;
use crate::types::{RegistryKind, TypeKey};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A converted argument on its way to a handler.
pub type Value = Box<dyn Any + Send>;

/// Type-erased view of a [`Converter`], as stored in a registry.
pub trait AnyConverter: Send + Sync {
    fn target(&self) -> TypeKey;

    fn convert_any(&self, token: Option<&str>) -> Result<Value, ConversionError>;
}

struct Erased<T, C> {
    inner: C,
    _target: PhantomData<fn() -> T>,
}

impl<T, C> AnyConverter for Erased<T, C>
where
    T: Send + 'static,
    C: Converter<T>,
{
    fn target(&self) -> TypeKey {
        self.inner.target()
    }

    fn convert_any(&self, token: Option<&str>) -> Result<Value, ConversionError> {
        self.inner
            .convert(token)
            .map(|value| Box::new(value) as Value)
    }
}

/// Maps each target type to the converter that produces it.
///
/// A type has at most one converter; registering again replaces it.
#[derive(Clone)]
pub struct ConverterRegistry {
    kind: RegistryKind,
    converters: HashMap<TypeKey, Arc<dyn AnyConverter>>,
}

impl ConverterRegistry {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            converters: HashMap::new(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Install `converter` for `T`. Returns true if it replaced another.
    pub fn register<T, C>(&mut self, converter: C) -> bool
    where
        T: Send + 'static,
        C: Converter<T> + 'static,
    {
        let key = TypeKey::of::<T>();
        let erased = Erased {
            inner: converter,
            _target: PhantomData,
        };
        let replaced = self.converters.insert(key, Arc::new(erased)).is_some();
        debug!(registry = %self.kind, target = %key, replaced, "Registered converter");
        replaced
    }

    /// Remove the converter for `T`, if any.
    pub fn unregister<T: 'static>(&mut self) -> bool {
        self.unregister_key(TypeKey::of::<T>())
    }

    pub fn unregister_key(&mut self, key: TypeKey) -> bool {
        let removed = self.converters.remove(&key).is_some();
        if removed {
            debug!(registry = %self.kind, target = %key, "Unregistered converter");
        }
        removed
    }

    /// Converter for `key`. Absence is not an error here; the caller decides.
    pub fn lookup(&self, key: TypeKey) -> Option<Arc<dyn AnyConverter>> {
        self.converters.get(&key).cloned()
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.converters.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
