use sha2::{Digest, Sha256};

use crate::error::CaError;

/// `SHA-256(cert.Raw)` as lowercase hex, matching §4.H's `Fingerprint`
/// operation exactly.
pub fn fingerprint(cert_pem: &str) -> Result<String, CaError> {
    let der = pem_to_der(cert_pem)?;
    let digest = Sha256::digest(&der);
    Ok(hex_lower(&digest))
}

/// The same digest, formatted uppercase and colon-delimited, matching the
/// [`core::ClientCertificate::fingerprint`] storage format (§3).
pub fn fingerprint_display(cert_pem: &str) -> Result<String, CaError> {
    let der = pem_to_der(cert_pem)?;
    let digest = Sha256::digest(&der);
    Ok(hex_colon_upper(&digest))
}

fn pem_to_der(pem: &str) -> Result<Vec<u8>, CaError> {
    let mut cursor = std::io::Cursor::new(pem.as_bytes());
    let cert = rustls_pemfile::certs(&mut cursor)
        .next()
        .ok_or_else(|| CaError::InvalidPem("no certificate block found".to_string()))?
        .map_err(|e| CaError::InvalidPem(e.to_string()))?;
    Ok(cert.to_vec())
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_colon_upper(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cert_pem() -> String {
        let key = rcgen::KeyPair::generate().unwrap();
        let params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
        params.self_signed(&key).unwrap().pem()
    }

    #[test]
    fn fingerprint_is_lowercase_hex_of_expected_length() {
        let pem = sample_cert_pem();
        let fp = fingerprint(&pem).unwrap();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn display_fingerprint_is_uppercase_colon_delimited() {
        let pem = sample_cert_pem();
        let fp = fingerprint_display(&pem).unwrap();
        assert_eq!(fp.len(), 32 * 2 + 31);
        assert!(fp.split(':').all(|octet| octet.len() == 2));
    }

    #[test]
    fn both_forms_derive_from_the_same_bytes() {
        let pem = sample_cert_pem();
        let lower = fingerprint(&pem).unwrap();
        let display = fingerprint_display(&pem).unwrap().replace(':', "").to_lowercase();
        assert_eq!(lower, display);
    }
}
