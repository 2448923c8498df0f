//! Configuration validation.
//!
//! Rules are checked in a fixed order and the first failure is returned,
//! so the same input always produces the same error. Validation is pure:
//! no logging, no I/O, no mutation of the input.

use rustls::pki_types::CertificateDer;

use super::certificate::{ClientIdentity, parse_client_key_pair, validate_certificate};
use super::tls_version::{TlsVersion, TlsVersionRange};
use super::types::ClientConfig;
use crate::error::{ConfigError, ConfigResult};

/// A configuration that passed every validation rule, with its TLS
/// material already decoded.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: ClientConfig,
    tls_versions: TlsVersionRange,
    server_certificate: Option<CertificateDer<'static>>,
    client_identity: Option<ClientIdentity>,
}

impl ValidatedConfig {
    /// The accepted configuration (an independent copy of the input).
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tls_versions(&self) -> TlsVersionRange {
        self.tls_versions
    }

    /// Parsed `certificate`, if one was configured.
    pub fn server_certificate(&self) -> Option<&CertificateDer<'static>> {
        self.server_certificate.as_ref()
    }

    /// Parsed mutual TLS identity, if one was configured.
    pub fn client_identity(&self) -> Option<&ClientIdentity> {
        self.client_identity.as_ref()
    }

    /// Give back the accepted configuration.
    pub fn into_inner(self) -> ClientConfig {
        self.config
    }
}

impl ClientConfig {
    /// Check this configuration, reporting the first rule it violates.
    pub fn validate(&self) -> ConfigResult<()> {
        self.resolve().map(|_| ())
    }

    /// Check this configuration and decode its TLS material.
    ///
    /// Rules, in order:
    /// 1. at least one URL
    /// 2. `tls_min_version` is a known label
    /// 3. `tls_max_version` is a known label
    /// 4. max version >= min version
    /// 5. `certificate`, if set, is a PEM encoded X.509 certificate
    /// 6. `client_tls_cert` and `client_tls_key` are both set or both empty
    /// 7. if both are set they form a matching key pair
    pub fn resolve(&self) -> ConfigResult<ValidatedConfig> {
        if self.urls.is_empty() {
            return Err(ConfigError::MissingUrls);
        }

        let tls_versions = self.resolve_tls_versions()?;

        let server_certificate = if self.certificate.is_empty() {
            None
        } else {
            Some(
                validate_certificate(self.certificate.as_bytes())
                    .map_err(ConfigError::ServerCertificate)?,
            )
        };

        let client_identity = match (
            self.client_tls_cert.is_empty(),
            self.client_tls_key.is_empty(),
        ) {
            (true, true) => None,
            (false, false) => Some(
                parse_client_key_pair(
                    self.client_tls_cert.as_bytes(),
                    self.client_tls_key.as_bytes(),
                )
                .map_err(ConfigError::ClientKeyPair)?,
            ),
            _ => return Err(ConfigError::IncompleteClientIdentity),
        };

        Ok(ValidatedConfig {
            config: self.clone(),
            tls_versions,
            server_certificate,
            client_identity,
        })
    }

    fn resolve_tls_versions(&self) -> ConfigResult<TlsVersionRange> {
        let min = TlsVersion::from_label(&self.tls_min_version)
            .ok_or_else(|| ConfigError::InvalidTlsMinVersion(self.tls_min_version.clone()))?;
        let max = TlsVersion::from_label(&self.tls_max_version)
            .ok_or_else(|| ConfigError::InvalidTlsMaxVersion(self.tls_max_version.clone()))?;

        TlsVersionRange::new(min, max).ok_or_else(|| ConfigError::TlsVersionOrder {
            min: self.tls_min_version.clone(),
            max: self.tls_max_version.clone(),
        })
    }
}

impl TryFrom<ClientConfig> for ValidatedConfig {
    type Error = ConfigError;

    fn try_from(config: ClientConfig) -> Result<Self, Self::Error> {
        config.resolve()
    }
}
