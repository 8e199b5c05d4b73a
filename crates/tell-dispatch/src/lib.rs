//! Command dispatch for chat tells.
//!
//! Resolves a raw line of text (`reserve-game TestPlayer 5`) to a registered
//! handler, converts every argument token to the handler's declared type
//! through pluggable converters, and invokes the handler.

mod converter;
mod dispatcher;
mod error;
mod handler;
mod registry;
mod table;
mod types;

pub use converter::*;
pub use dispatcher::Dispatcher;
pub use error::{Arity, ConfigurationError, ConversionError, DispatchError};
pub use handler::{CommandSet, Handler, HandlerDescriptor, ParamSpec};
pub use registry::{AnyConverter, ConverterRegistry, Value};
pub use table::{normalize, CommandTable};
pub use types::{RegistryKind, Rest, TypeKey};
