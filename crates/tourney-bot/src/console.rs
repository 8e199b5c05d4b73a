//! Line-oriented console transport.
//!
//! Each input line is `<sender><separator><command text>`, e.g.
//! `alice: reserve-game bob 5`. Every line gets exactly one reply line.

use crate::error::AppResult;
use crate::replies::reply_for;
use tell_dispatch::Dispatcher;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Split a console line into sender and command text.
///
/// Returns `None` for blank lines. A line without the separator is sent
/// with an empty sender, which the identity converter then rejects.
pub fn parse_line<'a>(line: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(separator) {
        Some((sender, text)) if !separator.is_empty() => Some((sender.trim(), text.trim())),
        _ => Some(("", line)),
    }
}

/// Dispatch one tell and produce the reply text.
pub fn respond(dispatcher: &Dispatcher<String>, sender: &str, text: &str) -> String {
    match dispatcher.dispatch(sender, text) {
        Ok(reply) => {
            debug!(sender = %sender, "Command handled");
            reply
        }
        Err(e) => reply_for(&e),
    }
}

/// Read tells from `input` until it closes, writing one reply per tell.
pub async fn run<I, O>(
    dispatcher: &Dispatcher<String>,
    separator: &str,
    input: I,
    mut output: O,
) -> AppResult<()>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        let Some((sender, text)) = parse_line(&line, separator) else {
            continue;
        };

        let reply = respond(dispatcher, sender, text);
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        handled += 1;
    }

    info!(handled, "Console input closed");
    Ok(())
}
