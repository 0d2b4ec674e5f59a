use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Process configuration, resolved once at startup (§9 supplement) rather
/// than re-read from the environment per request — mirrors the teacher's
/// convention of folding branded/legacy environment variables into one
/// `RuntimeOptions`-style struct up front.
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Root directory the [`core::LocalFileStore`] resolves paths under.
    pub data_dir: PathBuf,
    /// `DAEMON_SETUP_TOKEN` (§6); `None` means only the cached
    /// `node-auto-setup-token` value is accepted by the setup endpoint.
    pub setup_token: Option<String>,
    /// Directory on each managed node the logs-bundle endpoint reads.
    pub remote_log_dir: String,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_REMOTE_LOG_DIR: &str = "/srv/gameap/logs";

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = env::var("CORECTL_BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.parse().expect("default bind addr is valid"));
        let data_dir = env::var("CORECTL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let setup_token = env::var("DAEMON_SETUP_TOKEN").ok().filter(|v| !v.is_empty());
        let remote_log_dir =
            env::var("CORECTL_REMOTE_LOG_DIR").unwrap_or_else(|_| DEFAULT_REMOTE_LOG_DIR.to_string());

        Self {
            bind_addr,
            data_dir,
            setup_token,
            remote_log_dir,
        }
    }
}
