//! Startup orchestration for the chat session.
//!
//! Order matters: the server key is checked before any client exists, the
//! flag provider is released as soon as configuration is resolved, and the
//! backend is handed to the loop controller, which releases it on exit.

use tracing::{info, warn};

use cadet_core::chat::backend::ConversationBackend;
use cadet_core::chat::controller::{ChatController, LoopSummary};
use cadet_core::chat::session::{SeedOutcome, SessionInitializer};
use cadet_core::flags::readiness::ReadinessPolicy;
use cadet_core::flags::resolver::ConfigResolver;
use cadet_infra::config::{apply_env_overrides, data_dir, load_app_config};
use cadet_infra::conversation::{BackendOptions, HttpConversationBackend};
use cadet_infra::devcycle::{DevCycleOptions, DevCycleProvider};
use cadet_infra::env::require_server_key;
use cadet_types::flag::EvaluationContext;

use super::banner::{write_banner, write_warning};
use super::input::{ChatInput, PROMPT};

/// Run one chat session from startup to shutdown.
pub async fn run_chat() -> anyhow::Result<LoopSummary> {
    let mut config = load_app_config(&data_dir()).await;
    apply_env_overrides(&mut config);

    let server_key = require_server_key()?;

    // Resolve the system prompt and model, then release the flag provider.
    let context = EvaluationContext::new(config.flags.targeting_key.clone());
    let provider = DevCycleProvider::start(
        server_key,
        DevCycleOptions::from(&config.flags),
        &context,
    )?;
    let resolver = ConfigResolver::new(provider, context);
    resolver
        .wait_until_ready(&ReadinessPolicy::from(&config.flags))
        .await;
    let outcome = resolver.resolve_config(&config.flags).await;
    resolver.close().await;

    for fallback in &outcome.fallbacks {
        info!(key = %fallback.key, reason = %fallback.reason, "using default value");
    }

    let backend = HttpConversationBackend::new(BackendOptions::from(&config.backend))?;
    let initialized = match SessionInitializer::new(&backend, config.backend.session_name.clone())
        .initialize(&outcome.config)
        .await
    {
        Ok(initialized) => initialized,
        Err(err) => {
            backend.close().await;
            return Err(err.into());
        }
    };

    let (input, mut output) = match ChatInput::open(PROMPT) {
        Ok(opened) => opened,
        Err(err) => {
            backend.close().await;
            return Err(err.into());
        }
    };

    if let SeedOutcome::Degraded(err) = &initialized.seed {
        let message = format!("{err}; continuing without the system prompt");
        if let Err(err) = write_warning(output.diagnostics.as_mut(), &message) {
            warn!(error = %err, "failed to write warning");
        }
    }

    if let Err(err) = write_banner(output.answers.as_mut(), &initialized.session) {
        warn!(error = %err, "failed to write banner");
    }

    let summary = ChatController::new(backend, initialized.session, input, output.answers)
        .with_diagnostics(output.diagnostics)
        .with_opening_question(config.chat.opening_question().map(str::to_string))
        .with_idle_timeout(config.backend.stream_idle_timeout())
        .run()
        .await?;

    Ok(summary)
}
