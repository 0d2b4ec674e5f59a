//! mTLS transport for talking to gdaemon nodes (§4.B, §4.C).
//!
//! [`dialer::TlsDialer`] opens an authenticated, logged-in connection for a
//! single protocol [`wire::Mode`]; [`pool::NodePool`] and [`pool::PoolRegistry`]
//! keep a bounded set of those connections warm per node so services don't
//! pay a TLS handshake plus login round trip on every call.

mod config;
mod dialer;
mod error;
mod pool;
mod verifier;

pub use config::DialConfig;
pub use dialer::{validate_server_cert_pem, AuthenticatedStream, TlsDialer};
pub use error::NetError;
pub use pool::{NodePool, PoolRegistry, PooledConnection};
