/// Request-derived hints used to guess the panel's externally reachable
/// origin when rendering the setup one-liner (§4.I Setup).
///
/// `forwarded_host`/`forwarded_proto` model the `X-Forwarded-Host` and
/// `X-Forwarded-Proto` headers a reverse proxy may add in front of the
/// panel; `host` models the plain `Host` header. Precedence is
/// forwarded-host over host, forwarded-proto over a `https` default.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    pub host: Option<String>,
    pub forwarded_host: Option<String>,
    pub forwarded_proto: Option<String>,
}

impl HostContext {
    #[must_use]
    pub fn origin(&self) -> String {
        let host = self
            .forwarded_host
            .as_deref()
            .or(self.host.as_deref())
            .unwrap_or("localhost");
        let scheme = self.forwarded_proto.as_deref().unwrap_or("https");
        format!("{scheme}://{host}")
    }
}

/// Renders the bash one-liner an installer pastes on the daemon host to
/// exchange `create_token` for a signed certificate via `/gdaemon/create`
/// (§4.I Setup).
#[must_use]
pub fn render_setup_script(create_token: &str, host_ctx: &HostContext) -> String {
    let origin = host_ctx.origin();
    format!(
        "curl -fsSL '{origin}/gdaemon/install.sh' | bash -s -- --token '{create_token}' --panel '{origin}'\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_host_wins_over_host() {
        let ctx = HostContext {
            host: Some("internal:8080".into()),
            forwarded_host: Some("panel.example.com".into()),
            forwarded_proto: None,
        };
        assert_eq!(ctx.origin(), "https://panel.example.com");
    }

    #[test]
    fn falls_back_to_host_when_no_forwarded_host() {
        let ctx = HostContext {
            host: Some("panel.example.com:3000".into()),
            forwarded_host: None,
            forwarded_proto: Some("http".into()),
        };
        assert_eq!(ctx.origin(), "http://panel.example.com:3000");
    }

    #[test]
    fn defaults_when_nothing_is_known() {
        let ctx = HostContext::default();
        assert_eq!(ctx.origin(), "https://localhost");
    }

    #[test]
    fn script_embeds_token_and_panel_origin() {
        let ctx = HostContext {
            host: Some("panel.example.com".into()),
            ..Default::default()
        };
        let script = render_setup_script("abc123", &ctx);
        assert!(script.contains("abc123"));
        assert!(script.contains("https://panel.example.com"));
    }
}
