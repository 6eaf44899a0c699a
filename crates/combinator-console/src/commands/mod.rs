//! Command grammar and dispatch.
//!
//! Every command resolves its own failures: errors are printed as a single
//! line and the REPL continues.

mod account;
mod resources;

use anyhow::anyhow;
use combinator_auth::Session;
use combinator_client::ConsoleClient;

use crate::terminal::{Terminal, Tone};

/// Whether the REPL should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

const HELP: &[&str] = &[
    "  help                         - Show this help message",
    "  clear                        - Clear the terminal",
    "  register                     - Register a new account",
    "  login                        - Login to your account",
    "  logout                       - Logout from your account",
    "  reset-password               - Reset a forgotten password",
    "  whoami                       - Show current user",
    "  status                       - Show current status",
    "  exit                         - Leave the console",
    "",
    "  rdb list                     - List all RDB resources",
    "  rdb get <id>                 - Show an RDB resource",
    "  rdb add                      - Add a new RDB resource",
    "  rdb delete <id>              - Delete an RDB resource",
    "",
    "  kv list                      - List all KV resources",
    "  kv add                       - Add a new KV resource",
    "  kv delete <id>               - Delete a KV resource",
    "",
    "  worker list                  - List all workers",
    "  worker add                   - Create a new worker",
    "  worker get <id> [offset]     - Get worker details & versions",
    "  worker delete <id>           - Delete a worker",
    "  worker env <id>              - Show worker env vars",
    "  worker env:set <id>          - Set worker env vars",
    "  worker secret <id>           - Show worker secret keys",
    "  worker secret:set <id>       - Set worker secrets",
    "",
    "  domain list                  - List all custom domains",
    "  domain add                   - Add a new custom domain",
    "  domain get <id>              - Get domain status",
    "  domain delete <id>           - Delete a custom domain",
];

/// Runs one input line.
pub async fn dispatch<T: Terminal>(client: &ConsoleClient, term: &mut T, line: &str) -> Flow {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((command, args)) = parts.split_first() else {
        return Flow::Continue;
    };
    let command = command.to_lowercase();

    tracing::debug!(%command, args = args.len(), "Dispatching command");

    match command.as_str() {
        "help" => help(term),
        "clear" => term.clear(),
        "register" => account::register(client, term).await,
        "login" => account::login(client, term).await,
        "logout" => account::logout(client, term),
        "reset-password" => account::reset_password(client, term).await,
        "whoami" => account::whoami(client, term),
        "status" => account::status(client, term).await,
        "exit" | "quit" => return Flow::Exit,
        "rdb" => resources::rdb(client, term, args).await,
        "kv" => resources::kv(client, term, args).await,
        "worker" => resources::worker(client, term, args).await,
        "domain" => resources::domain(client, term, args).await,
        other => {
            term.print(&format!("Command not found: {other}"), Tone::Error);
            term.print("Type \"help\" for available commands", Tone::Info);
        }
    }
    Flow::Continue
}

/// The shell-style prompt for the current session.
pub fn prompt_prefix(session: &Session) -> String {
    format!("{}@console:~$", session.user_id().unwrap_or("guest"))
}

fn help<T: Terminal>(term: &mut T) {
    term.blank();
    term.print("Available Commands:", Tone::Info);
    term.blank();
    for line in HELP {
        term.print(line, Tone::Plain);
    }
    term.blank();
}

/// Prompts for one line, failing if input is closed.
async fn ask<T: Terminal>(term: &mut T, prompt: &str, secret: bool) -> anyhow::Result<String> {
    term.read_line(prompt, secret)
        .await
        .ok_or_else(|| anyhow!("input closed"))
}

fn report<T: Terminal>(term: &mut T, result: anyhow::Result<()>) {
    if let Err(e) = result {
        term.print(&format!("{e:#}"), Tone::Error);
    }
}
