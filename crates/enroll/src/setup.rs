use std::sync::Arc;
use std::time::Duration;

use core::TokenCache;
use tracing::info;

use crate::error::EnrollError;
use crate::script::{render_setup_script, HostContext};
use crate::token::random_base62;

/// Cache key the auto-setup token is looked up under when
/// `DAEMON_SETUP_TOKEN` isn't configured (§4.I Setup).
pub const AUTO_SETUP_TOKEN_KEY: &str = "node-auto-setup-token";
/// Cache key the create-token is stored/looked up under.
pub const CREATE_TOKEN_KEY: &str = "node-create-token";
/// TTL of the create-token once minted (§3).
pub const CREATE_TOKEN_TTL: Duration = Duration::from_secs(3600);
const CREATE_TOKEN_LEN: usize = 24;

/// Phase 1 of node enrollment: exchanges a one-shot setup token for a
/// create token and the bash one-liner that installs the daemon (§4.I).
pub struct SetupService {
    cache: Arc<dyn TokenCache>,
    /// `DAEMON_SETUP_TOKEN`, resolved once by the caller (§9 supplement);
    /// `None` means only the cached auto-setup token is accepted.
    configured_setup_token: Option<String>,
}

impl SetupService {
    #[must_use]
    pub fn new(cache: Arc<dyn TokenCache>, configured_setup_token: Option<String>) -> Self {
        Self {
            cache,
            configured_setup_token,
        }
    }

    /// Verifies `token`, mints a fresh create-token, and renders the
    /// installer one-liner. Returns [`EnrollError::InvalidSetupToken`] if
    /// `token` matches neither `DAEMON_SETUP_TOKEN` nor the cached
    /// `node-auto-setup-token` value.
    pub async fn setup(&self, token: &str, host_ctx: &HostContext) -> Result<String, EnrollError> {
        if !self.token_is_valid(token).await {
            return Err(EnrollError::InvalidSetupToken);
        }

        self.cache.delete(AUTO_SETUP_TOKEN_KEY).await;

        let create_token = random_base62(CREATE_TOKEN_LEN);
        self.cache
            .set(CREATE_TOKEN_KEY, create_token.clone(), CREATE_TOKEN_TTL)
            .await;
        info!("issued create token for pending node enrollment");

        Ok(render_setup_script(&create_token, host_ctx))
    }

    async fn token_is_valid(&self, token: &str) -> bool {
        if let Some(configured) = &self.configured_setup_token {
            if configured == token {
                return true;
            }
        }
        self.cache.get(AUTO_SETUP_TOKEN_KEY).await.as_deref() == Some(token)
    }
}
