//! Resource commands: rdb, kv, worker, domain.

use anyhow::Context;
use combinator_client::{ConsoleClient, EnvVars, WorkerVarUpdate};

use super::{ask, report};
use crate::format::format_bytes;
use crate::terminal::{Terminal, Tone};

fn require_auth<T: Terminal>(client: &ConsoleClient, term: &mut T) -> bool {
    if client.store().session().is_authenticated() {
        return true;
    }
    term.print("Please login first", Tone::Error);
    false
}

fn usage<T: Terminal>(term: &mut T, text: &str) {
    term.print(&format!("Usage: {text}"), Tone::Error);
}

fn status_tone(status: &str) -> Tone {
    match status {
        "active" | "success" => Tone::Success,
        "error" => Tone::Error,
        _ => Tone::Warning,
    }
}

// ==================== RDB ====================

pub async fn rdb<T: Terminal>(client: &ConsoleClient, term: &mut T, args: &[&str]) {
    if !require_auth(client, term) {
        return;
    }
    let result = match args {
        ["list", ..] => rdb_list(client, term).await.context("Failed to list RDBs"),
        ["get", id, ..] => rdb_get(client, term, id).await.context("Failed to get RDB"),
        ["add", ..] => rdb_add(client, term).await.context("Failed to create RDB"),
        ["delete", id, ..] => client
            .delete_rdb(id)
            .await
            .map(|()| term.print("RDB deleted successfully", Tone::Success))
            .context("Failed to delete RDB"),
        ["get"] => return usage(term, "rdb get <id>"),
        ["delete"] => return usage(term, "rdb delete <id>"),
        _ => return usage(term, "rdb [list|get|add|delete]"),
    };
    report(term, result);
}

async fn rdb_list<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let result = client.list_rdbs().await?;

    term.blank();
    term.print("=== RDB Resources ===", Tone::Info);
    if let Some(size) = result.database_size {
        term.print(&format!("Database Total: {}", format_bytes(size)), Tone::Info);
    }
    term.blank();

    if result.rdbs.is_empty() {
        term.print("No RDB resources found", Tone::Warning);
        return Ok(());
    }
    for rdb in &result.rdbs {
        term.print(&format!("ID: {}", rdb.id), Tone::Success);
        term.print(&format!("  Name: {}", rdb.name), Tone::Plain);
        term.print(&format!("  URL: {}", rdb.url), Tone::Plain);
        term.print(&format!("  Size: {}", format_bytes(rdb.size)), Tone::Plain);
        term.blank();
    }
    Ok(())
}

async fn rdb_get<T: Terminal>(client: &ConsoleClient, term: &mut T, id: &str) -> anyhow::Result<()> {
    let rdb = client.get_rdb(id).await?;
    term.blank();
    term.print(&format!("ID: {}", rdb.id), Tone::Success);
    term.print(&format!("  Name: {}", rdb.name), Tone::Plain);
    term.print(&format!("  URL: {}", rdb.url), Tone::Plain);
    term.print(&format!("  Size: {}", format_bytes(rdb.size)), Tone::Plain);
    Ok(())
}

async fn rdb_add<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let name = ask(term, "Enter RDB name:", false).await?;
    let result = client.create_rdb(&name).await?;
    term.blank();
    term.print(&format!("ID: {}", result.id), Tone::Info);
    term.print(
        result.message.as_deref().unwrap_or("RDB created"),
        Tone::Success,
    );
    Ok(())
}

// ==================== KV ====================

pub async fn kv<T: Terminal>(client: &ConsoleClient, term: &mut T, args: &[&str]) {
    if !require_auth(client, term) {
        return;
    }
    let result = match args {
        ["list", ..] => kv_list(client, term).await.context("Failed to list KVs"),
        ["add", ..] => kv_add(client, term).await.context("Failed to create KV"),
        ["delete", id, ..] => client
            .delete_kv(id)
            .await
            .map(|()| term.print("KV deleted successfully", Tone::Success))
            .context("Failed to delete KV"),
        ["delete"] => return usage(term, "kv delete <id>"),
        _ => return usage(term, "kv [list|add|delete]"),
    };
    report(term, result);
}

async fn kv_list<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let result = client.list_kvs().await?;

    term.blank();
    term.print("=== KV Resources ===", Tone::Info);
    if result.kvs.is_empty() {
        term.print("No KV resources found", Tone::Warning);
        return Ok(());
    }
    for kv in &result.kvs {
        term.print(&format!("ID: {}", kv.id), Tone::Success);
        term.print(&format!("  Type: {}", kv.kv_type), Tone::Plain);
        term.print(&format!("  URL: {}", kv.url), Tone::Plain);
        term.blank();
    }
    Ok(())
}

async fn kv_add<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let kv_type = ask(term, "Enter KV type (redis/memory):", false).await?;
    let url = ask(term, "Enter KV URL:", false).await?;
    let result = client.create_kv(&kv_type, &url).await?;

    term.blank();
    term.print(&format!("ID: {}", result.id), Tone::Info);
    match (&result.error, &result.message) {
        (Some(warning), _) => term.print(warning, Tone::Warning),
        (None, Some(message)) => term.print(message, Tone::Success),
        (None, None) => term.print("KV created", Tone::Success),
    }
    Ok(())
}

// ==================== Workers ====================

pub async fn worker<T: Terminal>(client: &ConsoleClient, term: &mut T, args: &[&str]) {
    if !require_auth(client, term) {
        return;
    }
    let result = match args {
        ["list", ..] => worker_list(client, term)
            .await
            .context("Failed to list workers"),
        ["add", ..] => worker_add(client, term)
            .await
            .context("Failed to create worker"),
        ["get", id] => worker_get(client, term, id, None)
            .await
            .context("Failed to get worker"),
        ["get", id, offset, ..] => {
            let Ok(offset) = offset.parse::<u64>() else {
                return usage(term, "worker get <id> [offset]");
            };
            worker_get(client, term, id, Some(offset))
                .await
                .context("Failed to get worker")
        }
        ["delete", id, ..] => client
            .delete_worker(id)
            .await
            .map(|()| term.print("Worker deleted successfully", Tone::Success))
            .context("Failed to delete worker"),
        ["env", id, ..] => worker_env(client, term, id)
            .await
            .context("Failed to get env"),
        ["env:set", id, ..] => worker_env_set(client, term, id)
            .await
            .context("Failed to set env"),
        ["secret", id, ..] => worker_secret(client, term, id)
            .await
            .context("Failed to get secrets"),
        ["secret:set", id, ..] => worker_secret_set(client, term, id)
            .await
            .context("Failed to set secrets"),
        [sub @ ("get" | "delete" | "env" | "env:set" | "secret" | "secret:set")] => {
            return usage(term, &format!("worker {sub} <id>"));
        }
        _ => {
            return usage(
                term,
                "worker [list|add|get|delete|env|env:set|secret|secret:set]",
            )
        }
    };
    report(term, result);
}

async fn worker_list<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let workers = client.list_workers().await?;

    term.blank();
    term.print("=== Workers ===", Tone::Info);
    if workers.is_empty() {
        term.print("No workers found", Tone::Warning);
        return Ok(());
    }
    for w in &workers {
        term.print(&format!("ID: {}", w.worker_id), Tone::Success);
        term.print(&format!("  Name: {}", w.worker_name), Tone::Plain);
        term.print(&format!("  Status: {}", w.status), status_tone(&w.status));
        term.print(
            &format!("  Active Version: {}", version_label(w.active_version_id)),
            Tone::Plain,
        );
        term.blank();
    }
    Ok(())
}

fn version_label(id: Option<i64>) -> String {
    id.map_or_else(|| "none".to_string(), |v| v.to_string())
}

async fn worker_add<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let name = ask(term, "Enter worker name:", false).await?;
    let worker = client.create_worker(&name).await?;
    term.blank();
    term.print(&format!("Worker ID: {}", worker.worker_id), Tone::Info);
    term.print(&format!("Name: {}", worker.worker_name), Tone::Info);
    Ok(())
}

async fn worker_get<T: Terminal>(
    client: &ConsoleClient,
    term: &mut T,
    id: &str,
    offset: Option<u64>,
) -> anyhow::Result<()> {
    let detail = client.get_worker(id, offset).await?;
    let w = &detail.worker;

    term.blank();
    term.print(&format!("=== Worker: {} ===", w.worker_name), Tone::Info);
    term.print(&format!("  ID: {}", w.worker_id), Tone::Plain);
    term.print(&format!("  Status: {}", w.status), status_tone(&w.status));
    term.print(
        &format!("  Active Version: {}", version_label(w.active_version_id)),
        Tone::Plain,
    );
    term.blank();

    if detail.versions.is_empty() {
        term.print("No deploy versions found", Tone::Warning);
        return Ok(());
    }
    term.print("--- Deploy Versions ---", Tone::Info);
    for v in &detail.versions {
        let active = if w.active_version_id == Some(v.id) {
            " [active]"
        } else {
            ""
        };
        term.print(&format!("  #{}{active}", v.id), status_tone(&v.status));
        term.print(&format!("    Image: {}", v.image), Tone::Plain);
        term.print(&format!("    Port: {}", v.port), Tone::Plain);
        term.print(&format!("    Status: {}", v.status), Tone::Plain);
        if !v.msg.is_empty() {
            term.print(&format!("    Msg: {}", v.msg), Tone::Plain);
        }
        term.print(&format!("    Created: {}", v.created_at), Tone::Plain);
        term.blank();
    }
    Ok(())
}

async fn worker_env<T: Terminal>(client: &ConsoleClient, term: &mut T, id: &str) -> anyhow::Result<()> {
    let env = client.worker_env(id).await?;
    term.blank();
    term.print(&format!("=== Env: {id} ==="), Tone::Info);
    if env.is_empty() {
        term.print("  (empty)", Tone::Warning);
    }
    for (key, value) in &env {
        term.print(&format!("  {key}={value}"), Tone::Plain);
    }
    term.blank();
    Ok(())
}

async fn worker_env_set<T: Terminal>(
    client: &ConsoleClient,
    term: &mut T,
    id: &str,
) -> anyhow::Result<()> {
    let updates = read_updates(
        term,
        "Enter env vars (KEY=VALUE, -KEY to remove), empty line to finish:",
    )
    .await;
    if updates.is_empty() {
        term.print("No env vars provided, cancelled", Tone::Warning);
        return Ok(());
    }
    let mut stored = EnvVars::new();
    for update in &updates {
        stored = client
            .set_worker_env(id, update)
            .await
            .with_context(|| update.key.clone())?;
    }
    term.print("Env updated, syncing to cluster...", Tone::Success);
    for (key, value) in &stored {
        term.print(&format!("  {key}={value}"), Tone::Plain);
    }
    Ok(())
}

async fn worker_secret<T: Terminal>(
    client: &ConsoleClient,
    term: &mut T,
    id: &str,
) -> anyhow::Result<()> {
    let keys = client.worker_secrets(id).await?;
    term.blank();
    term.print(&format!("=== Secrets: {id} ==="), Tone::Info);
    if keys.is_empty() {
        term.print("  (empty)", Tone::Warning);
    }
    for key in &keys {
        term.print(&format!("  {key}=********"), Tone::Plain);
    }
    term.blank();
    Ok(())
}

async fn worker_secret_set<T: Terminal>(
    client: &ConsoleClient,
    term: &mut T,
    id: &str,
) -> anyhow::Result<()> {
    let updates = read_updates(
        term,
        "Enter secrets (KEY=VALUE, -KEY to remove), empty line to finish:",
    )
    .await;
    if updates.is_empty() {
        term.print("No secrets provided, cancelled", Tone::Warning);
        return Ok(());
    }
    let mut keys = Vec::new();
    for update in &updates {
        keys = client
            .set_worker_secret(id, update)
            .await
            .with_context(|| update.key.clone())?;
    }
    term.print("Secrets updated, syncing to cluster...", Tone::Success);
    for key in &keys {
        term.print(&format!("  {key}=********"), Tone::Plain);
    }
    Ok(())
}

/// Parses one entry line: `KEY=VALUE` sets a variable, `-KEY` removes it.
fn parse_update(line: &str) -> Option<WorkerVarUpdate> {
    if let Some(key) = line.strip_prefix('-') {
        return (!key.is_empty() && !key.contains('=')).then(|| WorkerVarUpdate::remove(key));
    }
    match line.split_once('=') {
        Some((key, value)) if !key.is_empty() => Some(WorkerVarUpdate::set(key, value)),
        _ => None,
    }
}

/// Reads entry lines until an empty line or closed input.
///
/// Unparseable lines are rejected and the user is asked again.
async fn read_updates<T: Terminal>(term: &mut T, heading: &str) -> Vec<WorkerVarUpdate> {
    term.print(heading, Tone::Info);
    let mut updates = Vec::new();
    while let Some(line) = term.read_line("", false).await {
        if line.is_empty() {
            break;
        }
        match parse_update(&line) {
            Some(update) => updates.push(update),
            None => term.print("Invalid format, use KEY=VALUE or -KEY", Tone::Error),
        }
    }
    updates
}

// ==================== Domains ====================

pub async fn domain<T: Terminal>(client: &ConsoleClient, term: &mut T, args: &[&str]) {
    if !require_auth(client, term) {
        return;
    }
    let result = match args {
        ["list", ..] => domain_list(client, term)
            .await
            .context("Failed to list domains"),
        ["add", ..] => domain_add(client, term)
            .await
            .context("Failed to add domain"),
        ["get", id, ..] => domain_get(client, term, id)
            .await
            .context("Failed to get domain"),
        ["delete", id, ..] => client
            .delete_domain(id)
            .await
            .map(|()| term.print("Domain deleted successfully", Tone::Success))
            .context("Failed to delete domain"),
        ["get"] => return usage(term, "domain get <id>"),
        ["delete"] => return usage(term, "domain delete <id>"),
        _ => return usage(term, "domain [list|add|get|delete]"),
    };
    report(term, result);
}

async fn domain_list<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let result = client.list_domains().await?;

    term.blank();
    term.print("=== Custom Domains ===", Tone::Info);
    if result.domains.is_empty() {
        term.print("No custom domains found", Tone::Warning);
        return Ok(());
    }
    for d in &result.domains {
        term.print(&format!("ID: {}", d.id), Tone::Success);
        term.print(&format!("  Domain: {}", d.domain), Tone::Plain);
        term.print(&format!("  Target: {}", d.target), Tone::Plain);
        term.print(&format!("  Status: {}", d.status), Tone::Plain);
        term.blank();
    }
    Ok(())
}

async fn domain_add<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let domain = ask(term, "Enter your domain (e.g. api.example.com):", false).await?;
    let target = ask(term, "Enter target domain to proxy to:", false).await?;
    let result = client.create_domain(&domain, &target).await?;

    term.blank();
    term.print("Domain verification required!", Tone::Warning);
    term.blank();
    term.print("Add this TXT record to your DNS:", Tone::Info);
    term.print(&format!("  Name:  {}", result.txt_name), Tone::Plain);
    term.print(&format!("  Value: {}", result.txt_value), Tone::Plain);
    term.blank();
    term.print(&format!("ID: {}", result.id), Tone::Info);
    term.print(&format!("Status: {}", result.status), Tone::Warning);
    term.blank();
    term.print("Verification will run for 60 seconds...", Tone::Info);
    Ok(())
}

async fn domain_get<T: Terminal>(client: &ConsoleClient, term: &mut T, id: &str) -> anyhow::Result<()> {
    let d = client.get_domain(id).await?;
    term.blank();
    term.print(&format!("ID: {}", d.id), Tone::Success);
    term.print(&format!("  Domain: {}", d.domain), Tone::Plain);
    term.print(&format!("  Target: {}", d.target), Tone::Plain);
    term.print(&format!("  Status: {}", d.status), Tone::Plain);
    term.print(&format!("  TXT Name: {}", d.txt_name), Tone::Plain);
    term.print(&format!("  TXT Value: {}", d.txt_value), Tone::Plain);
    Ok(())
}
