//! Bridges a single verbosity level (set once at process startup, e.g. from
//! a CLI flag or the `RUST_LOG`-adjacent `CORECTL_LOG` env var) to a global
//! [`tracing`] subscriber, mirroring the teacher's verbosity-to-log-level
//! mapping but collapsed to the handful of levels this daemon's services
//! actually emit at (`tracing::{debug,info,warn,error}` spans per request).

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Process-wide verbosity, from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet,
    /// Request-level spans at `info` (the default).
    Normal,
    /// Per-frame wire traffic at `debug`.
    Verbose,
    /// Everything, including pool lease/release churn, at `trace`.
    Debug,
}

impl Verbosity {
    /// Maps a repeated `-v` flag count to a level: 0 is [`Verbosity::Normal`],
    /// 1 is [`Verbosity::Verbose`], 2+ is [`Verbosity::Debug`]. There is no
    /// level-0-means-quiet convention here — quiet is opt-in via `--quiet`,
    /// which callers should map to [`Verbosity::Quiet`] directly.
    #[must_use]
    pub fn from_flag_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Debug => "trace",
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "warn" => Ok(Verbosity::Quiet),
            "normal" | "info" => Ok(Verbosity::Normal),
            "verbose" | "debug" => Ok(Verbosity::Verbose),
            "debug2" | "trace" => Ok(Verbosity::Debug),
            other => Err(format!("{other} is not a recognized verbosity")),
        }
    }
}

/// Installs the global `tracing` subscriber for this process.
///
/// `RUST_LOG`, if set, takes precedence over `verbosity` for any target it
/// names explicitly — `EnvFilter` only falls back to the `verbosity`-derived
/// directive when `RUST_LOG` is absent. Call this once, at binary startup;
/// a second call is a logic error in the caller, not something this crate
/// guards against, matching `tracing_subscriber`'s own `set_global_default`
/// contract.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init(verbosity: Verbosity) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
