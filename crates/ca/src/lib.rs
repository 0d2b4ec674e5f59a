//! Root CA lifecycle, CSR signing, client certificate generation and
//! fingerprinting (§4.H).
//!
//! Key material is generated with `rcgen`'s default ECDSA P-256 keys
//! rather than RSA — `rcgen`'s key generation is backed by `ring`, which
//! cannot generate RSA key pairs, only sign with ones supplied externally.
//! This is a deliberate, documented deviation from the distilled spec's
//! literal "2048-bit RSA key" wording (see DESIGN.md); every other
//! property (validity window, key usages, issuer chain) matches §4.H.

mod error;
mod fingerprint;
mod service;
mod subject;

pub use error::CaError;
pub use fingerprint::{fingerprint, fingerprint_display};
pub use service::{CertAndKey, CertificateService};
pub use subject::SubjectOverrides;
