//! cadet entry point.
//!
//! Binary name: `cadet`
//!
//! Sets up tracing, then runs one interactive chat session. Any fatal error
//! is printed with its cause chain and the process exits non-zero.

mod chat;

use cadet_observe::tracing_setup;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_setup::init_tracing(tracing_setup::otel_enabled_from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = chat::runner::run_chat().await;

    tracing_setup::shutdown_tracing();
    result.map(|_| ())
}
