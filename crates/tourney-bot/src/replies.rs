//! Turning dispatch failures into replies for the sender.

use crate::commands::USAGE;
use crate::error::Rejected;
use tell_dispatch::{normalize, ConversionError, DispatchError};
use tracing::{debug, error, warn};

/// Reply text for a failed dispatch.
///
/// Wiring defects and unexpected handler failures are logged and answered
/// with an apology; everything the sender caused gets a specific message.
pub fn reply_for(err: &DispatchError) -> String {
    match err {
        DispatchError::NoSuchCommand { attempted } => {
            debug!(attempted = %attempted, "Unrecognized command");
            if attempted.is_empty() {
                "Say \"help\" to see what I can do.".to_string()
            } else {
                format!("I don't know the command \"{attempted}\". Say \"help\" for a list.")
            }
        }
        DispatchError::Conversion {
            command,
            position,
            source,
        } => {
            debug!(command = %command, ?position, error = %source, "Bad command input");
            conversion_reply(command, *position, source)
        }
        DispatchError::Configuration(e) => {
            error!(error = %e, "Command wiring error");
            "Sorry, I'm misconfigured and can't do that right now.".to_string()
        }
        DispatchError::Handler(e) => match e.downcast_ref::<Rejected>() {
            Some(rejected) => {
                debug!(reason = %rejected, "Command rejected");
                rejected.0.clone()
            }
            None => {
                warn!(error = %e, "Command failed");
                "Sorry, something went wrong.".to_string()
            }
        },
    }
}

fn conversion_reply(command: &str, position: Option<usize>, source: &ConversionError) -> String {
    match source {
        ConversionError::WrongArgumentCount { .. } => match usage(command) {
            Some(usage) => format!("Usage: {usage}"),
            None => format!("Wrong number of arguments for {command}."),
        },
        ConversionError::UnknownName { input } => format!("I don't know anyone called \"{input}\"."),
        ConversionError::Invalid { expected, input } if position == Some(0) => {
            format!("I can't take commands from \"{input}\" (not a valid {expected}).")
        }
        ConversionError::Invalid { expected, input } => {
            format!("\"{input}\" is not a valid {expected}.")
        }
        ConversionError::MissingInput => match usage(command) {
            Some(usage) => format!("Something is missing. Usage: {usage}"),
            None => "Something is missing.".to_string(),
        },
    }
}

fn usage(command: &str) -> Option<&'static str> {
    let key = normalize(command);
    USAGE
        .iter()
        .find(|(name, _)| normalize(name) == key)
        .map(|(_, usage)| *usage)
}
