/// Optional subject-field overrides applied when signing a CSR (§4.H
/// Sign's "apply optional subject overrides"). Every field left `None`
/// keeps whatever the CSR's own subject carried.
#[derive(Debug, Clone, Default)]
pub struct SubjectOverrides {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organizational_unit: Option<String>,
    /// Rendered under OID `1.2.840.113549.1.9.1` (PKCS#9 `emailAddress`),
    /// which `rcgen` has no named `DnType` for.
    pub email: Option<String>,
}

/// OID for the PKCS#9 `emailAddress` attribute.
pub const EMAIL_OID: &[u64] = &[1, 2, 840, 113_549, 1, 9, 1];

impl SubjectOverrides {
    pub(crate) fn apply(&self, dn: &mut rcgen::DistinguishedName) {
        if let Some(cn) = &self.common_name {
            dn.push(rcgen::DnType::CommonName, cn.as_str());
        }
        if let Some(org) = &self.organization {
            dn.push(rcgen::DnType::OrganizationName, org.as_str());
        }
        if let Some(country) = &self.country {
            dn.push(rcgen::DnType::CountryName, country.as_str());
        }
        if let Some(state) = &self.state {
            dn.push(rcgen::DnType::StateOrProvinceName, state.as_str());
        }
        if let Some(locality) = &self.locality {
            dn.push(rcgen::DnType::LocalityName, locality.as_str());
        }
        if let Some(ou) = &self.organizational_unit {
            dn.push(rcgen::DnType::OrganizationalUnitName, ou.as_str());
        }
        if let Some(email) = &self.email {
            dn.push(
                rcgen::DnType::CustomDnType(EMAIL_OID.to_vec()),
                email.as_str(),
            );
        }
    }
}
