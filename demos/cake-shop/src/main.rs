//! Cake shop example binary
//!
//! Builds the shop store, logs every state change, buys a few treats and
//! unsubscribes.

use cake_shop::{render_state, run_session, shop_store};
use statehouse_runtime::metrics::MetricsRecorder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cake_shop=info,statehouse_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut recorder = MetricsRecorder::new();
    recorder.install()?;

    let store = shop_store();
    println!("Initial state: {}", render_state(&store.get_state()));

    let subscription = store.subscribe_state(|state| {
        println!("Updated State: {}", render_state(state));
    });

    run_session(&store);

    subscription.unsubscribe();
    tracing::info!(listeners = store.subscriber_count(), "Unsubscribed");
    tracing::info!(state = %render_state(&store.get_state()), "Final state");

    if let Some(rendered) = recorder.render() {
        tracing::debug!("Store metrics:\n{rendered}");
    }

    Ok(())
}
