//! rustls client configuration for a validated directory config.
//!
//! Turns the resolved TLS policy (version range, trust anchor, client
//! identity, `insecure_tls`) into a [`rustls::ClientConfig`] ready for the
//! connection layer.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls::{SupportedProtocolVersion, version};
use tracing::{debug, warn};

use crate::config::{TlsVersion, TlsVersionRange, ValidatedConfig};
use crate::error::TlsSetupError;

/// Versions rustls can negotiate, newest first.
static IMPLEMENTED: &[(TlsVersion, &SupportedProtocolVersion)] = &[
    (TlsVersion::Tls13, &version::TLS13),
    (TlsVersion::Tls12, &version::TLS12),
];

/// The protocol versions in `range` that rustls implements, newest first.
///
/// TLS 1.0 and 1.1 are accepted as configuration labels but have no
/// implementation, so they never appear here.
pub fn supported_versions(range: TlsVersionRange) -> Vec<&'static SupportedProtocolVersion> {
    IMPLEMENTED
        .iter()
        .filter(|(v, _)| range.contains(*v))
        .map(|(_, p)| *p)
        .collect()
}

/// Build a rustls client config from a validated configuration.
pub fn client_config(validated: &ValidatedConfig) -> Result<Arc<ClientConfig>, TlsSetupError> {
    let range = validated.tls_versions();
    let versions = supported_versions(range);
    if versions.is_empty() {
        return Err(TlsSetupError::NoSupportedVersion {
            min: range.min().to_string(),
            max: range.max().to_string(),
        });
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder =
        ClientConfig::builder_with_provider(Arc::clone(&provider)).with_protocol_versions(&versions)?;

    let builder = if validated.config().insecure_tls {
        // Dangerous: skip certificate verification (for testing/self-signed certs only)
        warn!("insecure_tls is set; directory server certificates will not be verified");
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousNoVerifier { provider }))
    } else {
        builder.with_root_certificates(root_store(validated)?)
    };

    let config = match validated.client_identity() {
        Some(identity) => builder.with_client_auth_cert(
            identity.cert_chain().to_vec(),
            identity.private_key().clone_key(),
        )?,
        None => builder.with_no_client_auth(),
    };

    debug!(
        min = %range.min(),
        max = %range.max(),
        negotiable = versions.len(),
        client_auth = validated.client_identity().is_some(),
        "Built TLS client config"
    );

    Ok(Arc::new(config))
}

/// Trust anchors: the configured server certificate alone, or the platform roots.
fn root_store(validated: &ValidatedConfig) -> Result<RootCertStore, TlsSetupError> {
    let mut roots = RootCertStore::empty();

    if let Some(cert) = validated.server_certificate() {
        roots.add(cert.clone()).map_err(TlsSetupError::TrustAnchor)?;
        return Ok(roots);
    }

    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        warn!(error = %e, "Error loading native certs");
    }
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    if ignored > 0 {
        warn!(ignored, "Skipped unparsable native root certificates");
    }
    debug!(added, "Loaded native root certificates");

    Ok(roots)
}

/// Accepts any server certificate but still checks handshake signatures.
#[derive(Debug)]
struct DangerousNoVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for DangerousNoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
