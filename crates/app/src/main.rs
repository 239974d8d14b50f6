//! Demo shell: runs the gate against the in-memory session source and walks
//! through a sign-in and sign-out.

use std::time::Duration;

use anyhow::Context;
use crownchat_app::{sign_out, AppConfig, GateWorker, LoginScreen, Router};
use crownchat_auth::{InMemorySessionSource, LoginForm, RegisterForm};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crownchat_observability::init();

    let config = AppConfig::from_env();
    tracing::info!(
        splash_ms = config.gate.splash_min.as_millis() as u64,
        debounce_ms = config.gate.redirect_debounce.as_millis() as u64,
        initial_route = %config.initial_route,
        "starting crownchat shell"
    );

    let source = InMemorySessionSource::new();
    let demo = RegisterForm {
        username: "demo".into(),
        display_name: "Demo User".into(),
        email: "demo@crownchat.app".into(),
        password: "crownchat".into(),
        confirm_password: "crownchat".into(),
        profile_picture: None,
    };
    let data = demo
        .validate()
        .map_err(|errors| anyhow::anyhow!("demo account is invalid: {errors:?}"))?;
    source.seed_account(data).context("seeding demo account")?;

    let router = Router::new(config.initial_route.clone());
    let gate = GateWorker::new(config.gate, &source, &router).spawn();
    let mut render = gate.watch_render();

    // The provider finishes its initial check with no persisted session.
    source.initialize();

    let settle = config.gate.splash_min + config.gate.redirect_debounce * 2;
    tokio::time::sleep(settle).await;
    tracing::info!(render = ?*render.borrow_and_update(), path = %router.path(), "settled");

    let login = LoginForm {
        email: demo.email.clone(),
        password: demo.password.clone(),
    };
    LoginScreen::new(&source)
        .submit(&login)
        .await
        .map_err(|feedback| anyhow::anyhow!("demo sign-in rejected: {feedback:?}"))?;
    tokio::time::sleep(config.gate.redirect_debounce * 2).await;
    tracing::info!(path = %router.path(), "after sign-in");

    let outcome = sign_out(&source).await;
    if !outcome.success {
        anyhow::bail!("demo sign-out failed: {}", outcome.error.unwrap_or_default());
    }
    tokio::time::sleep(config.gate.redirect_debounce * 2).await;
    tracing::info!(path = %router.path(), "after sign-out");

    tokio::time::timeout(Duration::from_secs(5), gate.shutdown())
        .await
        .context("gate worker did not stop in time")??;
    Ok(())
}
