//! Bootstrap bundling (§4.J): the operator-facing certificates ZIP and the
//! per-node log archive.

mod certificates;
mod error;
mod logs;

pub use certificates::CertificateBundle;
pub use error::BundleError;
pub use logs::build_logs_zip;
