//! Typed flag resolution with safe fallbacks.
//!
//! `ConfigResolver` owns the flag provider and the evaluation context built
//! at startup. Resolution never fails: every provider error is logged and
//! turned into a [`Resolution::Fallback`] carrying the caller's default.

use tracing::{debug, info, warn};

use cadet_types::config::{FlagSettings, ResolvedConfig};
use cadet_types::flag::{
    EvaluationContext, FlagError, FlagFallback, FlagType, Resolution,
};

use super::provider::FlagProvider;
use super::readiness::{wait_for_ready, Readiness, ReadinessPolicy};

/// Startup configuration plus the flags that fell back to defaults.
#[derive(Debug)]
pub struct ConfigOutcome {
    pub config: ResolvedConfig,
    pub fallbacks: Vec<FlagFallback>,
}

/// Resolves typed configuration values from a flag provider.
pub struct ConfigResolver<P> {
    provider: P,
    context: EvaluationContext,
}

impl<P: FlagProvider> ConfigResolver<P> {
    pub fn new(provider: P, context: EvaluationContext) -> Self {
        Self { provider, context }
    }

    /// Wait (bounded by `policy`) for the provider to become ready.
    pub async fn wait_until_ready(&self, policy: &ReadinessPolicy) -> Readiness {
        let readiness = wait_for_ready(&self.provider, policy).await;
        match readiness {
            Readiness::Ready { attempts } => {
                debug!(provider = self.provider.name(), attempts, "flag provider ready");
            }
            Readiness::TimedOut { attempts } => {
                warn!(
                    provider = self.provider.name(),
                    attempts,
                    ceiling_ms = policy.ceiling().as_millis() as u64,
                    "flag provider not ready, continuing with defaults where needed"
                );
            }
        }
        readiness
    }

    /// Resolve `key` as a `T`, falling back to `default` on any failure.
    ///
    /// One attempt per call; no retries.
    pub async fn resolve<T: FlagType>(
        &self,
        key: &str,
        default: T,
        context: &EvaluationContext,
    ) -> Resolution<T> {
        let outcome = match self.provider.resolve(key, T::KIND, context).await {
            Ok(value) => {
                let actual = value.kind();
                T::from_flag_value(value).ok_or_else(|| FlagError::TypeMismatch {
                    key: key.to_string(),
                    expected: T::KIND,
                    actual,
                })
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(value) => {
                debug!(key, provider = self.provider.name(), "flag resolved");
                Resolution::Value(value)
            }
            Err(reason) => {
                warn!(
                    key,
                    provider = self.provider.name(),
                    error = %reason,
                    "flag resolution failed, using default"
                );
                Resolution::Fallback {
                    value: default,
                    reason,
                }
            }
        }
    }

    /// Resolve the system prompt and model name for the startup context.
    ///
    /// Each field falls back independently.
    pub async fn resolve_config(&self, settings: &FlagSettings) -> ConfigOutcome {
        let mut fallbacks = Vec::new();

        let prompt = self
            .resolve(&settings.prompt_key, settings.prompt_default.clone(), &self.context)
            .await;
        let system_prompt = take_value(&settings.prompt_key, prompt, &mut fallbacks);

        let model = self
            .resolve(&settings.model_key, settings.model_default.clone(), &self.context)
            .await;
        let model_name = take_value(&settings.model_key, model, &mut fallbacks);

        info!(
            model = %model_name,
            fallbacks = fallbacks.len(),
            "startup configuration resolved"
        );

        ConfigOutcome {
            config: ResolvedConfig {
                system_prompt,
                model_name,
            },
            fallbacks,
        }
    }

    /// Release the provider. The resolver is not usable afterwards.
    pub async fn close(self) {
        self.provider.close().await;
    }
}

fn take_value<T>(key: &str, resolution: Resolution<T>, fallbacks: &mut Vec<FlagFallback>) -> T {
    match resolution {
        Resolution::Value(value) => value,
        Resolution::Fallback { value, reason } => {
            fallbacks.push(FlagFallback {
                key: key.to_string(),
                reason,
            });
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFlagProvider;
    use cadet_types::flag::{FlagKind, FlagValue};

    fn ctx() -> EvaluationContext {
        EvaluationContext::new("your-user-id")
    }

    #[tokio::test]
    async fn test_unreachable_provider_returns_default_for_every_type() {
        let resolver = ConfigResolver::new(StaticFlagProvider::unreachable(), ctx());

        let s = resolver.resolve("system-prompt", "fallback".to_string(), &ctx()).await;
        assert_eq!(s.value(), "fallback");
        assert!(matches!(s.fallback_reason(), Some(FlagError::Transport(_))));

        let b = resolver.resolve("beta", true, &ctx()).await;
        assert!(*b.value());
        assert!(b.is_fallback());

        let n = resolver.resolve("max-turns", 12.0, &ctx()).await;
        assert_eq!(*n.value(), 12.0);

        let j = resolver
            .resolve("layout", serde_json::json!({"x": 1}), &ctx())
            .await;
        assert_eq!(j.into_value(), serde_json::json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_served_value_is_returned() {
        let provider = StaticFlagProvider::ready()
            .with_flag("model", FlagValue::String("Claude 3.5 Sonnet".into()));
        let resolver = ConfigResolver::new(provider, ctx());
        let model = resolver.resolve("model", "GPT-4o Chat Model".to_string(), &ctx()).await;
        assert!(!model.is_fallback());
        assert_eq!(model.into_value(), "Claude 3.5 Sonnet");
    }

    #[tokio::test]
    async fn test_missing_key_falls_back() {
        let resolver = ConfigResolver::new(StaticFlagProvider::ready(), ctx());
        let value = resolver.resolve("absent", false, &ctx()).await;
        assert!(!*value.value());
        assert!(matches!(
            value.fallback_reason(),
            Some(FlagError::NotFound { key }) if key == "absent"
        ));
    }

    #[tokio::test]
    async fn test_type_mismatch_falls_back() {
        let provider = StaticFlagProvider::ready().with_flag("model", FlagValue::Number(4.0));
        let resolver = ConfigResolver::new(provider, ctx());
        let model = resolver.resolve("model", "default".to_string(), &ctx()).await;
        assert_eq!(model.value(), "default");
        assert!(matches!(
            model.fallback_reason(),
            Some(FlagError::TypeMismatch {
                expected: FlagKind::String,
                actual: FlagKind::Number,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_not_ready_provider_falls_back() {
        let provider = StaticFlagProvider::never_ready()
            .with_flag("model", FlagValue::String("served".into()));
        let resolver = ConfigResolver::new(provider, ctx());
        let model = resolver.resolve("model", "default".to_string(), &ctx()).await;
        assert_eq!(model.value(), "default");
        assert!(matches!(model.fallback_reason(), Some(FlagError::ProviderNotReady)));
    }

    #[tokio::test]
    async fn test_resolve_config_falls_back_per_field() {
        let provider = StaticFlagProvider::ready()
            .with_flag("system-prompt", FlagValue::String("Be Picard.".into()));
        let resolver = ConfigResolver::new(provider, ctx());
        let settings = FlagSettings::default();

        let outcome = resolver.resolve_config(&settings).await;
        assert_eq!(outcome.config.system_prompt, "Be Picard.");
        assert_eq!(outcome.config.model_name, settings.model_default);
        assert_eq!(outcome.fallbacks.len(), 1);
        assert_eq!(outcome.fallbacks[0].key, "model");
    }

    #[tokio::test]
    async fn test_resolve_config_with_dead_provider_uses_all_defaults() {
        let resolver = ConfigResolver::new(StaticFlagProvider::unreachable(), ctx());
        let settings = FlagSettings::default();
        let outcome = resolver.resolve_config(&settings).await;
        assert_eq!(outcome.config, settings.defaults());
        assert_eq!(outcome.fallbacks.len(), 2);
    }

    #[tokio::test]
    async fn test_close_releases_provider() {
        let provider = StaticFlagProvider::ready();
        let closes = provider.close_counter();
        let resolver = ConfigResolver::new(provider, ctx());
        resolver.close().await;
        assert_eq!(closes.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
