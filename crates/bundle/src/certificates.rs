use std::io::{Cursor, Write};
use std::sync::Arc;

use ca::{CertificateService, SubjectOverrides};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::BundleError;

const SERVER_CERT_PATH: &str = "certs/daemon/server.crt";
const SERVER_KEY_PATH: &str = "certs/daemon/server.key";

const README: &str = "\
# GameAP Daemon Certificates

Extract this archive's contents to `/etc/gameap-daemon/certs/` on the node
and reference them from the daemon's configuration file:

```
ca_certificate_file = /etc/gameap-daemon/certs/ca.crt
certificate_chain_file = /etc/gameap-daemon/certs/server.crt
private_key_file = /etc/gameap-daemon/certs/server.key
```

Restart the daemon after installing these files.
";

/// Assembles the operator-facing certificates ZIP (§4.J): a stable
/// `ca.crt`/`README.md` pair plus a freshly minted `server.key`/`server.crt`
/// on every call.
pub struct CertificateBundle {
    cert_service: Arc<CertificateService>,
}

impl CertificateBundle {
    #[must_use]
    pub fn new(cert_service: Arc<CertificateService>) -> Self {
        Self { cert_service }
    }

    /// Builds the ZIP bytes. `ca.crt` and `README.md` are byte-identical
    /// across calls given the same root; `server.key`/`server.crt` differ
    /// every time (§8 invariant 5).
    pub async fn build(&self) -> Result<Vec<u8>, BundleError> {
        let ca_pem = self.cert_service.root().await?;
        let overrides = SubjectOverrides {
            common_name: Some("GameAP".to_string()),
            ..Default::default()
        };
        let generated = self
            .cert_service
            .generate(SERVER_CERT_PATH, SERVER_KEY_PATH, &overrides)
            .await?;

        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            zip.start_file("ca.crt", options)?;
            zip.write_all(ca_pem.as_bytes())?;

            zip.start_file("server.key", options)?;
            zip.write_all(generated.key_pem.as_bytes())?;

            zip.start_file("server.crt", options)?;
            zip.write_all(generated.cert_pem.as_bytes())?;

            zip.start_file("README.md", options)?;
            zip.write_all(README.as_bytes())?;

            zip.finish()?;
        }
        Ok(buf)
    }
}
