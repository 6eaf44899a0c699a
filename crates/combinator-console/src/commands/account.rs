//! Account lifecycle: register, login, logout, password reset.

use anyhow::Context;
use combinator_auth::{SecretString, SigningScheme};
use combinator_client::ConsoleClient;

use super::{ask, report};
use crate::terminal::{Terminal, Tone};

pub async fn register<T: Terminal>(client: &ConsoleClient, term: &mut T) {
    let result = try_register(client, term)
        .await
        .context("Registration failed");
    report(term, result);
}

async fn try_register<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let email = ask(term, "Enter email:", false).await?;
    term.print("Sending verification code...", Tone::Info);
    client.send_code(&email).await?;
    term.print("Verification code sent to your email", Tone::Success);

    let code = ask(term, "Enter verification code:", false).await?;
    let password = ask(term, "Enter password:", true).await?;
    let result = client.register(&email, &code, &password).await?;

    client.store().save(
        &result.user_id,
        &result.token,
        SecretString::new(result.secret_key.as_str()),
    );

    term.blank();
    term.print("Registration successful!", Tone::Success);
    term.print(&format!("User ID: {}", result.user_id), Tone::Info);
    term.print(&format!("Email: {}", result.email), Tone::Info);
    term.blank();

    if result.secret_key.is_empty() {
        term.print(
            "No secret key was issued; signed commands will fail until you login with one",
            Tone::Warning,
        );
        return Ok(());
    }

    term.print("Secret key saved locally", Tone::Success);
    term.blank();
    term.print("=== IMPORTANT: Backup your secret key ===", Tone::Warning);
    term.print(
        "If you lose your local data, you will need this key!",
        Tone::Warning,
    );
    term.blank();
    term.print(&result.secret_key, Tone::Info);
    Ok(())
}

pub async fn login<T: Terminal>(client: &ConsoleClient, term: &mut T) {
    let result = try_login(client, term).await.context("Login failed");
    report(term, result);
}

async fn try_login<T: Terminal>(client: &ConsoleClient, term: &mut T) -> anyhow::Result<()> {
    let email = ask(term, "Enter email:", false).await?;
    let password = ask(term, "Enter password:", true).await?;
    let result = client.login(&email, &password).await?;

    let secret = if let Some(secret) = client.store().stored_secret(&result.user_id) {
        term.print("Secret key loaded from local storage", Tone::Info);
        secret
    } else {
        term.print("No stored secret key found for this user", Tone::Warning);
        prompt_secret(client, term).await?
    };

    client.store().save(&result.user_id, &result.token, secret);

    term.blank();
    term.print("Login successful!", Tone::Success);
    term.print(&format!("User ID: {}", result.user_id), Tone::Info);
    Ok(())
}

/// Asks for the signing secret in the form the configured scheme needs.
///
/// An RSA key spans several lines, so it is read from a PEM file.
async fn prompt_secret<T: Terminal>(
    client: &ConsoleClient,
    term: &mut T,
) -> anyhow::Result<SecretString> {
    match client.store().scheme() {
        SigningScheme::Hmac => {
            let key = ask(term, "Enter your secret key (sk_...):", true).await?;
            Ok(SecretString::new(key))
        }
        SigningScheme::Rsa => {
            let path = ask(term, "Enter path to your private key (PEM):", false).await?;
            let pem = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("could not read {path}"))?;
            Ok(SecretString::new(pem))
        }
    }
}

pub fn logout<T: Terminal>(client: &ConsoleClient, term: &mut T) {
    client.store().clear();
    term.print("Logged out successfully", Tone::Success);
    term.print("Credentials cleared from local storage", Tone::Info);
}

pub async fn reset_password<T: Terminal>(client: &ConsoleClient, term: &mut T) {
    let result = try_reset_password(client, term)
        .await
        .context("Password reset failed");
    report(term, result);
}

async fn try_reset_password<T: Terminal>(
    client: &ConsoleClient,
    term: &mut T,
) -> anyhow::Result<()> {
    let email = ask(term, "Enter email:", false).await?;
    term.print("Sending verification code...", Tone::Info);
    client.send_code(&email).await?;
    term.print("Verification code sent to your email", Tone::Success);

    let code = ask(term, "Enter verification code:", false).await?;
    let new_password = ask(term, "Enter new password:", true).await?;
    let result = client.reset_password(&email, &code, &new_password).await?;

    let message = if result.message.is_empty() {
        "Password reset successfully"
    } else {
        result.message.as_str()
    };
    term.print(message, Tone::Success);
    term.print("You can now login with your new password", Tone::Info);
    Ok(())
}

pub fn whoami<T: Terminal>(client: &ConsoleClient, term: &mut T) {
    let session = client.store().session();
    term.print(session.user_id().unwrap_or("guest"), Tone::Info);
}

pub async fn status<T: Terminal>(client: &ConsoleClient, term: &mut T) {
    let session = client.store().session();
    let online = client.health().await.unwrap_or(false);

    term.blank();
    term.print("=== System Status ===", Tone::Info);
    match session.user_id() {
        Some(user) => term.print(&format!("User: {user}"), Tone::Success),
        None => term.print("User: Not logged in", Tone::Warning),
    }
    if session.is_authenticated() {
        term.print("Token: Active", Tone::Success);
    } else {
        term.print("Token: None", Tone::Warning);
    }
    if session.can_sign() {
        term.print("Secret key: Loaded", Tone::Success);
    } else {
        term.print("Secret key: Missing", Tone::Warning);
    }
    term.print(
        &format!("Signing: {} ({:?})", client.store().scheme(), client.policy()),
        Tone::Plain,
    );
    if online {
        term.print(&format!("API: {} (online)", client.base_url()), Tone::Success);
    } else {
        term.print(&format!("API: {} (offline)", client.base_url()), Tone::Error);
    }
    term.blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{client_for, logged_in_client};
    use crate::terminal::testing::ScriptedTerminal;
    use combinator_auth::Session;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "a@b.co", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "alice123456",
                "token": "jwt"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn register_saves_session_and_shows_secret_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/send-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "code sent"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({"email": "a@b.co", "code": "123456", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "alice123456",
                "email": "a@b.co",
                "token": "jwt",
                "secret_key": "sk_fresh"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut term = ScriptedTerminal::new(["a@b.co", "123456", "hunter22"]);
        register(&client, &mut term).await;

        assert!(term.printed("Registration successful!", Tone::Success));
        assert_eq!(
            term.output.iter().filter(|(_, l)| l == "sk_fresh").count(),
            1
        );
        assert_eq!(
            client.store().session(),
            Session::new("alice123456", "jwt", Some("sk_fresh".into()))
        );
        assert_eq!(
            term.prompts[2],
            ("Enter password:".to_string(), true)
        );
    }

    #[tokio::test]
    async fn login_reuses_stored_secret() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let client = client_for(&server);
        client.store().save("alice123456", "old-jwt", "sk_saved".into());
        client.store().reset();

        let mut term = ScriptedTerminal::new(["a@b.co", "hunter22"]);
        login(&client, &mut term).await;

        assert!(term.printed("Secret key loaded from local storage", Tone::Info));
        assert!(term.printed("Login successful!", Tone::Success));
        assert_eq!(term.prompts.len(), 2);
        assert_eq!(
            client.store().session(),
            Session::new("alice123456", "jwt", Some("sk_saved".into()))
        );
    }

    #[tokio::test]
    async fn login_prompts_for_secret_of_other_user() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let client = client_for(&server);
        client.store().save("bob", "bob-jwt", "sk_bob".into());

        let mut term = ScriptedTerminal::new(["a@b.co", "hunter22", "sk_alice"]);
        login(&client, &mut term).await;

        assert!(term.printed("No stored secret key found for this user", Tone::Warning));
        assert_eq!(
            term.prompts[2],
            ("Enter your secret key (sk_...):".to_string(), true)
        );
        assert_eq!(
            client.store().session(),
            Session::new("alice123456", "jwt", Some("sk_alice".into()))
        );
    }

    #[tokio::test]
    async fn login_failure_reports_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid credentials"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut term = ScriptedTerminal::new(["a@b.co", "wrong"]);
        login(&client, &mut term).await;

        assert!(term.printed("Login failed: invalid credentials", Tone::Error));
        assert_eq!(client.store().session(), Session::anonymous());
    }

    #[tokio::test]
    async fn closed_input_aborts_login() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let mut term = ScriptedTerminal::new(["a@b.co"]);
        login(&client, &mut term).await;

        assert!(term.printed("Login failed: input closed", Tone::Error));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server);
        let mut term = ScriptedTerminal::default();

        logout(&client, &mut term);
        whoami(&client, &mut term);

        assert!(term.printed("Logged out successfully", Tone::Success));
        assert!(term.printed("guest", Tone::Info));
        assert!(client.store().stored_secret("alice123456").is_none());
    }

    #[tokio::test]
    async fn reset_password_sends_new_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/send-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "code sent"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/reset-password"))
            .and(body_json(json!({
                "email": "a@b.co",
                "code": "654321",
                "new_password": "correct-horse"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "password reset successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut term = ScriptedTerminal::new(["a@b.co", "654321", "correct-horse"]);
        reset_password(&client, &mut term).await;

        assert!(term.printed("password reset successfully", Tone::Success));
    }

    #[tokio::test]
    async fn status_reports_session_and_reachability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = logged_in_client(&server);
        let mut term = ScriptedTerminal::default();
        status(&client, &mut term).await;

        assert!(term.printed("User: alice123456", Tone::Success));
        assert!(term.printed("Token: Active", Tone::Success));
        assert!(term.printed("Secret key: Loaded", Tone::Success));
        assert!(term.printed(&format!("API: {} (online)", server.uri()), Tone::Success));
    }
}
