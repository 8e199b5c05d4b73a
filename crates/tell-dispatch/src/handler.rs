//! Typed command handlers and the sets they are registered in.

use crate::error::{Arity, ConfigurationError, DispatchError};
use crate::registry::Value;
use crate::types::{Rest, TypeKey};
use std::any::type_name;
use std::sync::Arc;

/// How one handler parameter is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSpec {
    /// The sender, converted through the identity registry. Always first.
    Identity(TypeKey),
    /// A single token converted through the argument registry.
    Value(TypeKey),
    /// The unconsumed remainder of the line, as a [`Rest`].
    CaptureRest,
}

impl ParamSpec {
    fn classify(key: TypeKey) -> Self {
        if key.is::<Rest>() {
            Self::CaptureRest
        } else {
            Self::Value(key)
        }
    }
}

/// A closure that can be registered as a command.
///
/// Implemented for `Fn(I, A1, .., An) -> anyhow::Result<R>` with up to six
/// arguments after the sender `I`. `Args` is the full parameter tuple and
/// only exists to keep the implementations apart.
pub trait Handler<Args, R>: Send + Sync + 'static {
    /// Declared type of the sender parameter.
    fn identity() -> TypeKey;

    /// Declared types of the remaining parameters, in order.
    fn params() -> Vec<TypeKey>;

    /// Call the handler with already converted values.
    fn invoke(&self, identity: Value, args: Vec<Value>) -> Result<R, DispatchError>;
}

fn take<T: 'static>(value: Option<Value>) -> Result<T, DispatchError> {
    let mismatch = || ConfigurationError::TypeMismatch {
        expected: type_name::<T>(),
    };
    let value = value.ok_or_else(mismatch)?;
    match value.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(mismatch().into()),
    }
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        impl<F, I, $($arg,)* R> Handler<(I, $($arg,)*), R> for F
        where
            F: Fn(I, $($arg,)*) -> anyhow::Result<R> + Send + Sync + 'static,
            I: 'static,
            $($arg: 'static,)*
        {
            fn identity() -> TypeKey {
                TypeKey::of::<I>()
            }

            fn params() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$arg>(),)*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, identity: Value, args: Vec<Value>) -> Result<R, DispatchError> {
                let identity = take::<I>(Some(identity))?;
                let mut args = args.into_iter();
                $(let $arg = take::<$arg>(args.next())?;)*
                (self)(identity, $($arg,)*).map_err(DispatchError::Handler)
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);

type CallFn<R> = dyn Fn(Value, Vec<Value>) -> Result<R, DispatchError> + Send + Sync;

/// Everything the dispatcher knows about one command.
pub struct HandlerDescriptor<R> {
    name: String,
    identity: TypeKey,
    params: Vec<ParamSpec>,
    call: Box<CallFn<R>>,
}

impl<R: 'static> HandlerDescriptor<R> {
    fn new<Args, H: Handler<Args, R>>(name: &str, handler: H) -> Self {
        let identity = H::identity();
        let mut params = vec![ParamSpec::Identity(identity)];
        params.extend(H::params().into_iter().map(ParamSpec::classify));
        Self {
            name: name.to_string(),
            identity,
            params,
            call: Box::new(move |identity, args| handler.invoke(identity, args)),
        }
    }

    /// Command name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters, starting with the identity.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn identity_type(&self) -> TypeKey {
        self.identity
    }

    /// Types of the parameters converted through the argument registry.
    pub fn value_types(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.params.iter().filter_map(|param| match param {
            ParamSpec::Value(key) => Some(*key),
            _ => None,
        })
    }

    /// Whether the last parameter captures the rest of the line.
    pub fn captures_rest(&self) -> bool {
        matches!(self.params.last(), Some(ParamSpec::CaptureRest))
    }

    /// Number of tokens the command takes before any captured text.
    pub fn arity(&self) -> Arity {
        let tokens = self.value_types().count();
        if self.captures_rest() {
            Arity::AtLeast(tokens)
        } else {
            Arity::Exact(tokens)
        }
    }

    /// A capture anywhere but in the last position cannot be bound.
    pub(crate) fn check_capture(&self) -> Result<(), ConfigurationError> {
        let captures = self
            .params
            .iter()
            .filter(|param| matches!(param, ParamSpec::CaptureRest))
            .count();
        if captures > 1 || (captures == 1 && !self.captures_rest()) {
            return Err(ConfigurationError::MisplacedCapture {
                command: self.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn invoke(&self, identity: Value, args: Vec<Value>) -> Result<R, DispatchError> {
        (self.call)(identity, args)
    }
}

/// A named group of commands registered with a dispatcher together.
///
/// ```ignore
/// let set = CommandSet::new("tourney")
///     .command("basic-teller", |who: User| Ok(format!("hello {who}")))
///     .command("reserve-game", |who: User, player: Player, board: i32| {
///         Ok(format!("{who} reserved board {board} for {player}"))
///     });
/// ```
pub struct CommandSet<R> {
    name: String,
    handlers: Vec<Arc<HandlerDescriptor<R>>>,
}

impl<R: 'static> CommandSet<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    /// Add a command. Names are matched ignoring case and separators.
    pub fn command<Args, H: Handler<Args, R>>(mut self, name: &str, handler: H) -> Self {
        self.handlers
            .push(Arc::new(HandlerDescriptor::new(name, handler)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &[Arc<HandlerDescriptor<R>>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<R> Clone for CommandSet<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handlers: self.handlers.clone(),
        }
    }
}
