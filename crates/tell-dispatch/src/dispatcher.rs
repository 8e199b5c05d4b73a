//! Resolves a tell to a handler call.

use crate::converter::{Converter, RestConverter};
use crate::error::{ConfigurationError, ConversionError, DispatchError};
use crate::handler::{CommandSet, HandlerDescriptor, ParamSpec};
use crate::registry::{AnyConverter, ConverterRegistry, Value};
use crate::table::CommandTable;
use crate::types::{RegistryKind, TypeKey};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

/// Command dispatcher.
///
/// Holds the command table and two converter registries: one for the
/// sender identity, one for every other argument. All methods take `&self`;
/// share a dispatcher between tasks with `Arc`.
///
/// Registration changes are serialized and swap in a fully built table, so a
/// concurrent [`dispatch`](Self::dispatch) sees either the old or the new
/// table, never a mix. A dispatch in progress keeps the converters it
/// started with.
pub struct Dispatcher<R> {
    sets: Mutex<Vec<CommandSet<R>>>,
    table: RwLock<Arc<CommandTable<R>>>,
    identity: RwLock<ConverterRegistry>,
    arguments: RwLock<ConverterRegistry>,
}

/// Converters resolved for one dispatch.
struct Binding {
    identity: Arc<dyn AnyConverter>,
    values: Vec<Slot>,
}

/// Argument converter for one parameter, if the registry had one.
///
/// A missing converter is only reported once dispatch reaches the
/// parameter, after the identity and the argument count were checked.
struct Slot {
    key: TypeKey,
    converter: Option<Arc<dyn AnyConverter>>,
}

impl Slot {
    fn converter(&self) -> Result<&Arc<dyn AnyConverter>, ConfigurationError> {
        self.converter
            .as_ref()
            .ok_or_else(|| missing(RegistryKind::Argument, self.key))
    }
}

impl<R: 'static> Dispatcher<R> {
    pub fn new() -> Self {
        Self {
            sets: Mutex::new(Vec::new()),
            table: RwLock::new(Arc::new(CommandTable::empty())),
            identity: RwLock::new(ConverterRegistry::new(RegistryKind::Identity)),
            arguments: RwLock::new(ConverterRegistry::new(RegistryKind::Argument)),
        }
    }

    /// Install a command set, replacing any earlier set with the same name.
    ///
    /// On error nothing changes and the previous table stays in use.
    pub fn register(&self, set: CommandSet<R>) -> Result<(), ConfigurationError> {
        let mut sets = self.sets.lock();
        let mut next: Vec<CommandSet<R>> = sets
            .iter()
            .filter(|existing| existing.name() != set.name())
            .cloned()
            .collect();
        let name = set.name().to_string();
        let count = set.len();
        next.push(set);

        self.rebuild(&next)?;
        *sets = next;
        info!(set = %name, commands = count, "Registered command set");
        Ok(())
    }

    /// Remove a command set by name. Returns false if it was not registered.
    pub fn unregister(&self, set_name: &str) -> Result<bool, ConfigurationError> {
        let mut sets = self.sets.lock();
        if !sets.iter().any(|set| set.name() == set_name) {
            return Ok(false);
        }
        let next: Vec<CommandSet<R>> = sets
            .iter()
            .filter(|set| set.name() != set_name)
            .cloned()
            .collect();

        self.rebuild(&next)?;
        *sets = next;
        info!(set = %set_name, "Unregistered command set");
        Ok(true)
    }

    fn rebuild(&self, sets: &[CommandSet<R>]) -> Result<(), ConfigurationError> {
        let table = CommandTable::build(sets)?;
        debug!(commands = table.len(), "Rebuilt command table");
        *self.table.write() = Arc::new(table);
        Ok(())
    }

    /// Install a converter for `T` in the selected registry.
    ///
    /// Returns true if it replaced an earlier converter for `T`.
    pub fn register_converter<T, C>(&self, kind: RegistryKind, converter: C) -> bool
    where
        T: Send + 'static,
        C: Converter<T> + 'static,
    {
        self.registry(kind).write().register(converter)
    }

    pub fn unregister_converter<T: 'static>(&self, kind: RegistryKind) -> bool {
        self.registry(kind).write().unregister::<T>()
    }

    fn registry(&self, kind: RegistryKind) -> &RwLock<ConverterRegistry> {
        match kind {
            RegistryKind::Identity => &self.identity,
            RegistryKind::Argument => &self.arguments,
        }
    }

    /// The current command table.
    pub fn table(&self) -> Arc<CommandTable<R>> {
        Arc::clone(&self.table.read())
    }

    /// Registered command names as spelled at registration, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.table().names()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table().contains(name)
    }

    /// Check that every parameter type of every command has a converter.
    ///
    /// Call once after wiring; a dispatch would otherwise only find out
    /// when the command is first used.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let table = self.table();
        for descriptor in table.descriptors() {
            for slot in self.bind(descriptor)?.values {
                slot.converter()?;
            }
        }
        Ok(())
    }

    /// Resolve `line` sent by `sender` and run the matching handler.
    ///
    /// Every argument is converted before the handler is called; on any
    /// resolution error the handler does not run. Errors from the handler
    /// itself come back as [`DispatchError::Handler`].
    pub fn dispatch(&self, sender: &str, line: &str) -> Result<R, DispatchError> {
        let line = line.trim();
        let (candidate, remainder) = split_first(line);
        if candidate.is_empty() {
            return Err(DispatchError::NoSuchCommand {
                attempted: String::new(),
            });
        }

        let table = self.table();
        let descriptor = table
            .get(candidate)
            .ok_or_else(|| DispatchError::NoSuchCommand {
                attempted: candidate.to_string(),
            })?;

        let binding = self.bind(descriptor)?;
        let fail = |position: Option<usize>, source: ConversionError| DispatchError::Conversion {
            command: descriptor.name().to_string(),
            position,
            source,
        };

        let identity = binding
            .identity
            .convert_any(Some(sender))
            .map_err(|e| fail(Some(0), e))?;

        let args = convert_args(descriptor, &binding, remainder.trim(), fail)?;
        descriptor.invoke(identity, args)
    }

    /// Snapshot the converters `descriptor` needs. Only a missing identity
    /// converter fails here.
    fn bind(&self, descriptor: &HandlerDescriptor<R>) -> Result<Binding, ConfigurationError> {
        let key = descriptor.identity_type();
        let identity = self
            .identity
            .read()
            .lookup(key)
            .ok_or_else(|| missing(RegistryKind::Identity, key))?;
        let arguments = self.arguments.read();
        let values = descriptor
            .value_types()
            .map(|key| Slot {
                key,
                converter: arguments.lookup(key),
            })
            .collect();
        Ok(Binding { identity, values })
    }
}

impl<R: 'static> Default for Dispatcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(registry: RegistryKind, key: TypeKey) -> ConfigurationError {
    ConfigurationError::MissingConverter {
        registry,
        type_name: key.short_name(),
    }
}

fn convert_args<R: 'static, F>(
    descriptor: &HandlerDescriptor<R>,
    binding: &Binding,
    remainder: &str,
    fail: F,
) -> Result<Vec<Value>, DispatchError>
where
    F: Fn(Option<usize>, ConversionError) -> DispatchError,
{
    let wanted = binding.values.len();
    let (tokens, rest) = if descriptor.captures_rest() {
        let (tokens, rest) = split_tokens(remainder, wanted);
        (tokens, Some(rest))
    } else {
        (remainder.split_whitespace().collect::<Vec<_>>(), None)
    };

    if tokens.len() != wanted {
        return Err(fail(
            None,
            ConversionError::WrongArgumentCount {
                expected: descriptor.arity(),
                actual: tokens.len(),
            },
        ));
    }

    let mut args = Vec::with_capacity(descriptor.params().len());
    let mut slots = binding.values.iter();
    let mut tokens = tokens.into_iter();
    for (position, param) in descriptor.params().iter().enumerate() {
        match param {
            ParamSpec::Identity(_) => {}
            ParamSpec::Value(_) => {
                let (Some(slot), Some(token)) = (slots.next(), tokens.next()) else {
                    break;
                };
                let value = slot
                    .converter()?
                    .convert_any(Some(token))
                    .map_err(|e| fail(Some(position), e))?;
                args.push(value);
            }
            ParamSpec::CaptureRest => {
                let value = RestConverter
                    .convert(rest)
                    .map_err(|e| fail(Some(position), e))?;
                args.push(Box::new(value) as Value);
            }
        }
    }
    Ok(args)
}

/// Split off the first whitespace-delimited token. The remainder is not trimmed.
fn split_first(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], &line[end..]),
        None => (line, ""),
    }
}

/// Take up to `count` leading tokens; the rest of the text is returned
/// trimmed at both ends with its inner whitespace untouched.
fn split_tokens(text: &str, count: usize) -> (Vec<&str>, &str) {
    let mut tokens = Vec::with_capacity(count);
    let mut rest = text;
    while tokens.len() < count {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (token, tail) = split_first(rest);
        tokens.push(token);
        rest = tail;
    }
    (tokens, rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{IntegerConverter, StringConverter};
    use crate::error::Arity;
    use crate::types::Rest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dispatcher() -> Dispatcher<String> {
        let dispatcher = Dispatcher::new();
        dispatcher.register_converter(RegistryKind::Identity, StringConverter::new());
        dispatcher.register_converter(RegistryKind::Argument, StringConverter::new());
        dispatcher.register_converter(RegistryKind::Argument, IntegerConverter::new());
        dispatcher
    }

    #[test]
    fn test_split_first() {
        assert_eq!(split_first("reserve-game a 5"), ("reserve-game", " a 5"));
        assert_eq!(split_first("help"), ("help", ""));
        assert_eq!(split_first(""), ("", ""));
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens("6  hello   there ", 1), (vec!["6"], "hello   there"));
        assert_eq!(split_tokens("6", 1), (vec!["6"], ""));
        assert_eq!(split_tokens("", 2), (vec![], ""));
        assert_eq!(split_tokens(" a, b ", 0), (vec![], "a, b"));
    }

    #[test]
    fn test_dispatch_no_argument_command() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command("basicTeller", |who: String| Ok(who)))
            .unwrap();

        assert_eq!(dispatcher.dispatch("TestUser", "basicTeller").unwrap(), "TestUser");
        assert_eq!(
            dispatcher.dispatch("TestUser", "  basic-teller   \t ").unwrap(),
            "TestUser"
        );
    }

    #[test]
    fn test_dispatch_empty_line_is_no_such_command() {
        let dispatcher = dispatcher();
        let err = dispatcher.dispatch("TestUser", "   ").unwrap_err();
        assert!(matches!(err, DispatchError::NoSuchCommand { attempted } if attempted.is_empty()));
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command("reserve", |who: String| Ok(who)))
            .unwrap();

        let err = dispatcher.dispatch("TestUser", "reserve-game foo").unwrap_err();
        assert!(
            matches!(err, DispatchError::NoSuchCommand { ref attempted } if attempted == "reserve-game")
        );
    }

    #[test]
    fn test_dispatch_capture_rest_after_value() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command(
                "set-board",
                |_who: String, board: i32, note: Rest| Ok(format!("{board}|{note}")),
            ))
            .unwrap();

        assert_eq!(
            dispatcher
                .dispatch("TestUser", "set-board  4   late   start, sorry! ")
                .unwrap(),
            "4|late   start, sorry!"
        );
        assert_eq!(dispatcher.dispatch("TestUser", "set-board 4").unwrap(), "4|");

        let err = dispatcher.dispatch("TestUser", "set-board").unwrap_err();
        assert_eq!(
            err.conversion_error(),
            Some(&ConversionError::WrongArgumentCount {
                expected: Arity::AtLeast(1),
                actual: 0
            })
        );
    }

    #[test]
    fn test_dispatch_reports_failing_position() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command(
                "pair",
                |_who: String, a: i32, b: i32| Ok(format!("{a}-{b}")),
            ))
            .unwrap();

        match dispatcher.dispatch("TestUser", "pair 1 two").unwrap_err() {
            DispatchError::Conversion {
                command,
                position,
                source,
            } => {
                assert_eq!(command, "pair");
                assert_eq!(position, Some(2));
                assert_eq!(source, ConversionError::invalid("integer", "two"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_converter_is_configuration_error() {
        struct Team;
        let dispatcher = dispatcher();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        dispatcher
            .register(CommandSet::new("test").command("join", move |who: String, _team: Team| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(who)
            }))
            .unwrap();

        let err = dispatcher.dispatch("TestUser", "join blue").unwrap_err();
        assert_eq!(
            err.configuration_error(),
            Some(&ConfigurationError::MissingConverter {
                registry: RegistryKind::Argument,
                type_name: "Team",
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(dispatcher.validate().is_err());
    }

    #[test]
    fn test_wrong_count_reported_before_missing_converter() {
        struct Team;
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command("join", |who: String, _team: Team| Ok(who)))
            .unwrap();

        let err = dispatcher.dispatch("TestUser", "join").unwrap_err();
        assert_eq!(
            err.conversion_error(),
            Some(&ConversionError::WrongArgumentCount {
                expected: Arity::Exact(1),
                actual: 0
            })
        );

        let err = dispatcher.dispatch("TestUser", "join blue green").unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_bad_value_before_missing_converter_is_reported_first() {
        struct Team;
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command(
                "join",
                |who: String, _board: i32, _team: Team| Ok(who),
            ))
            .unwrap();

        let err = dispatcher.dispatch("TestUser", "join x blue").unwrap_err();
        assert_eq!(
            err.conversion_error(),
            Some(&ConversionError::invalid("integer", "x"))
        );

        let err = dispatcher.dispatch("TestUser", "join 3 blue").unwrap_err();
        assert!(err.configuration_error().is_some());
    }

    #[test]
    fn test_unregistered_converter_is_missing_on_dispatch() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command("board", |_who: String, n: i32| {
                Ok(n.to_string())
            }))
            .unwrap();
        assert_eq!(dispatcher.dispatch("TestUser", "board 7").unwrap(), "7");

        assert!(dispatcher.unregister_converter::<i32>(RegistryKind::Argument));
        assert!(!dispatcher.unregister_converter::<i32>(RegistryKind::Argument));

        let err = dispatcher.dispatch("TestUser", "board 7").unwrap_err();
        assert_eq!(
            err.configuration_error(),
            Some(&ConfigurationError::MissingConverter {
                registry: RegistryKind::Argument,
                type_name: "i32",
            })
        );
        assert!(dispatcher.validate().is_err());

        dispatcher.register_converter(RegistryKind::Argument, IntegerConverter::new());
        assert_eq!(dispatcher.dispatch("TestUser", "board 7").unwrap(), "7");
    }

    #[test]
    fn test_missing_identity_converter() {
        let dispatcher = Dispatcher::<String>::new();
        dispatcher
            .register(CommandSet::new("test").command("basic", |who: String| Ok(who)))
            .unwrap();

        let err = dispatcher.dispatch("TestUser", "basic").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Configuration(ConfigurationError::MissingConverter {
                registry: RegistryKind::Identity,
                ..
            })
        ));
    }

    #[test]
    fn test_failed_registration_keeps_previous_table() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("first").command("reserve-game", |who: String| Ok(who)))
            .unwrap();

        let err = dispatcher
            .register(CommandSet::new("second").command("ReserveGame", |who: String| Ok(who)))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateCommand { .. }));
        assert_eq!(dispatcher.command_names(), vec!["reserve-game"]);
    }

    #[test]
    fn test_reregistering_set_replaces_it() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("tourney").command("old", |who: String| Ok(who)))
            .unwrap();
        dispatcher
            .register(CommandSet::new("tourney").command("new", |who: String| Ok(who)))
            .unwrap();

        assert!(!dispatcher.contains("old"));
        assert!(dispatcher.contains("new"));

        assert!(dispatcher.unregister("tourney").unwrap());
        assert!(!dispatcher.unregister("tourney").unwrap());
        assert!(dispatcher.table().is_empty());
    }

    #[test]
    fn test_validate_passes_when_wired() {
        let dispatcher = dispatcher();
        dispatcher
            .register(CommandSet::new("test").command(
                "note",
                |who: String, _board: i32, _text: Rest| Ok(who),
            ))
            .unwrap();
        assert!(dispatcher.validate().is_ok());
    }
}
