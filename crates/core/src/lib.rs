//! Domain types and the external-collaborator traits the node control core
//! is built against: node and client-certificate records, a file store, a
//! one-shot token cache, and the umbrella error enum.
//!
//! Everything in this crate is inert data plus trait contracts — no I/O, no
//! networking, no certificate math. Those live in `wire`, `net`, `ca`,
//! `enroll` and `daemon-client`, which all depend on `core` rather than on
//! each other's concrete types.

mod client_certificate;
mod error;
mod file_store;
mod node;
mod retry;
mod token_cache;

pub use client_certificate::{ClientCertificate, ClientCertificateId, ClientCertificateRepository};
pub use error::{CoreError, CoreErrorKind};
pub use file_store::{FileStore, InMemoryFileStore, LocalFileStore};
pub use node::{
    InstallMethod, Node, NodeId, NodeRepository, OsTag, ScriptOverrides,
};
pub use retry::retry;
pub use token_cache::{InMemoryTokenCache, TokenCache};
