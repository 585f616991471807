//! User fetch example binary
//!
//! Subscribes a state logger, dispatches the fetch thunk and waits for it to
//! settle.

use statehouse_core::thunk::Dispatchable;
use statehouse_runtime::metrics::MetricsRecorder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_fetch::{HttpUserApi, UsersConfig, UsersEnvironment, fetch_users, users_store};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_fetch=info,statehouse_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut recorder = MetricsRecorder::new();
    recorder.install()?;

    let config = UsersConfig::from_env()?;
    let api = HttpUserApi::new(&config)?;
    tracing::info!(endpoint = %api.endpoint(), "Using user endpoint");

    let store = users_store(UsersEnvironment::new(api));

    let _subscription = store.subscribe_state(|state| {
        match serde_json::to_string(state) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "Failed to render state"),
        }
    });

    let dispatched = store.dispatch(Dispatchable::Thunk(fetch_users()))?;
    if let Some(task) = dispatched.into_task() {
        task.wait().await?;
    }

    let state = store.get_state();
    if state.error.is_empty() {
        tracing::info!(users = state.users.len(), "Fetch complete");
    } else {
        tracing::warn!(error = %state.error, "Fetch failed");
    }

    if let Some(rendered) = recorder.render() {
        tracing::debug!("Store metrics:\n{rendered}");
    }

    Ok(())
}
