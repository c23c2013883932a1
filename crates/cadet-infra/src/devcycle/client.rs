//! DevCycleProvider -- concrete [`FlagProvider`] backed by the DevCycle
//! bucketing API.
//!
//! `start` returns immediately and fetches every variable for the startup
//! user in a background task. The provider reports ready once that fetch
//! has succeeded. Lookups for the startup user are then served from the
//! cached variables; lookups for any other user go to the per-variable
//! endpoint.
//!
//! The server key is wrapped in [`secrecy::SecretString`] and only exposed
//! when building the `Authorization` header.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cadet_core::flags::provider::FlagProvider;
use cadet_types::config::FlagSettings;
use cadet_types::flag::{EvaluationContext, FlagError, FlagKind, FlagValue};

use super::types::{DevCycleUser, DevCycleVariable, VariableMap};

/// Connection settings for [`DevCycleProvider`].
#[derive(Debug, Clone)]
pub struct DevCycleOptions {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl From<&FlagSettings> for DevCycleOptions {
    fn from(settings: &FlagSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            request_timeout: settings.request_timeout(),
        }
    }
}

struct UserCache {
    user_id: String,
    variables: VariableMap,
}

struct Inner {
    client: reqwest::Client,
    server_key: SecretString,
    base_url: String,
    cache: OnceLock<UserCache>,
    closed: AtomicBool,
}

impl Inner {
    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, FlagError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| FlagError::Transport(format!("invalid flag service URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                FlagError::Transport(format!("flag service URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// POST `user` to the path built from `segments`. `key` names the
    /// variable for 404 mapping.
    async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        user: &DevCycleUser,
        key: Option<&str>,
    ) -> Result<T, FlagError> {
        let response = self
            .client
            .post(self.url(segments)?)
            .header(AUTHORIZATION, self.server_key.expose_secret())
            .json(user)
            .send()
            .await
            .map_err(|e| FlagError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match (status.as_u16(), key) {
                (401 | 403, _) => FlagError::Unauthorized,
                (404, Some(key)) => FlagError::NotFound {
                    key: key.to_string(),
                },
                _ => FlagError::Transport(format!("HTTP {status}: {body}")),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FlagError::Deserialization(format!("failed to parse response: {e}")))
    }
}

/// DevCycle flag provider.
///
/// Does not derive `Debug`; the server key must never be printed.
pub struct DevCycleProvider {
    inner: Arc<Inner>,
    cancel: CancellationToken,
    init_task: Mutex<Option<JoinHandle<()>>>,
}

impl DevCycleProvider {
    /// Build the HTTP client and start background initialization for `context`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`FlagError::Transport`] if the HTTP client cannot be built.
    pub fn start(
        server_key: SecretString,
        options: DevCycleOptions,
        context: &EvaluationContext,
    ) -> Result<Self, FlagError> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| FlagError::Transport(format!("failed to create HTTP client: {e}")))?;

        let inner = Arc::new(Inner {
            client,
            server_key,
            base_url: options.base_url,
            cache: OnceLock::new(),
            closed: AtomicBool::new(false),
        });
        let cancel = CancellationToken::new();
        let task = tokio::spawn(initialize(
            Arc::clone(&inner),
            DevCycleUser::from(context),
            cancel.clone(),
        ));

        Ok(Self {
            inner,
            cancel,
            init_task: Mutex::new(Some(task)),
        })
    }
}

async fn initialize(inner: Arc<Inner>, user: DevCycleUser, cancel: CancellationToken) {
    let user_id = user.user_id.clone();
    tokio::select! {
        _ = cancel.cancelled() => {
            debug!("flag provider initialization cancelled");
        }
        result = inner.post::<VariableMap>(&["v1", "variables"], &user, None) => match result {
            Ok(variables) => {
                info!(variables = variables.len(), "flag provider initialized");
                let _ = inner.cache.set(UserCache { user_id, variables });
            }
            Err(err) => {
                warn!(error = %err, "flag provider initialization failed");
            }
        },
    }
}

impl FlagProvider for DevCycleProvider {
    fn name(&self) -> &str {
        "devcycle"
    }

    fn is_ready(&self) -> bool {
        !self.inner.closed.load(Ordering::SeqCst) && self.inner.cache.get().is_some()
    }

    async fn resolve(
        &self,
        key: &str,
        _kind: FlagKind,
        context: &EvaluationContext,
    ) -> Result<FlagValue, FlagError> {
        if !self.is_ready() {
            return Err(FlagError::ProviderNotReady);
        }

        if let Some(cache) = self.inner.cache.get() {
            if cache.user_id == context.targeting_key() {
                return match cache.variables.get(key) {
                    Some(variable) => variable.to_flag_value(),
                    None => Err(FlagError::NotFound {
                        key: key.to_string(),
                    }),
                };
            }
        }

        let user = DevCycleUser::from(context);
        let variable: DevCycleVariable = self
            .inner
            .post(&["v1", "variables", key], &user, Some(key))
            .await?;
        variable.to_flag_value()
    }

    async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.cancel.cancel();

        let task = self.init_task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            let _ = task.await;
        }
        debug!("flag provider closed");
    }
}
