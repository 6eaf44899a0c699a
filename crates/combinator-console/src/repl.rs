//! The read-eval-print loop.

use combinator_client::ConsoleClient;

use crate::commands::{self, prompt_prefix, Flow};
use crate::terminal::{Terminal, Tone};

const BANNER: &str = r"
   ____                _     _             _
  / ___|___  _ __ ___ | |__ (_)_ __   __ _| |_ ___  _ __
 | |   / _ \| '_ ` _ \| '_ \| | '_ \ / _` | __/ _ \| '__|
 | |__| (_) | | | | | | |_) | | | | | (_| | || (_) | |
  \____\___/|_| |_| |_|_.__/|_|_| |_|\__,_|\__\___/|_|
";

/// Runs commands until `exit` or end of input.
///
/// `restored` is whether a persisted session was loaded at startup.
pub async fn run<T: Terminal>(client: &ConsoleClient, term: &mut T, restored: bool) {
    for line in BANNER.lines() {
        term.print(line, Tone::Info);
    }
    term.blank();
    term.print(
        &format!("Welcome to Combinator Console v{}", env!("CARGO_PKG_VERSION")),
        Tone::Info,
    );
    term.print("Type \"help\" for available commands", Tone::Info);
    term.blank();

    if restored {
        let session = client.store().session();
        let user = session.user_id().unwrap_or("guest");
        term.print(&format!("Session restored for {user}"), Tone::Success);
        term.blank();
    }

    loop {
        let prompt = prompt_prefix(&client.store().session());
        let Some(line) = term.read_line(&prompt, false).await else {
            tracing::debug!("Input closed");
            break;
        };
        if commands::dispatch(client, term, &line).await == Flow::Exit {
            break;
        }
    }
}
