//! PEM certificate and key-pair parsing.
//!
//! These are syntactic gates only. Nothing here checks trust chains, expiry,
//! key usage or hostnames; that belongs to the TLS handshake.

use std::fmt;
use std::io::Cursor;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use x509_parser::der_parser::ber::{BerObject, BerObjectContent, Class, Tag};
use x509_parser::der_parser::parse_der;
use x509_parser::oid_registry::{OID_KEY_TYPE_EC_PUBLIC_KEY, OID_PKCS1_RSAENCRYPTION};
use x509_parser::pem::{Pem, parse_x509_pem};
use x509_parser::prelude::{FromDer, X509Certificate};
use x509_parser::public_key::PublicKey;

use crate::error::CertificateError;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

const PEM_BEGIN: &[u8] = b"-----BEGIN ";
const PEM_END: &[u8] = b"-----END ";
const PEM_DASHES: &[u8] = b"-----";

/// Decode a single PEM `CERTIFICATE` block and check it parses as X.509.
///
/// Only the first PEM block is considered. Returns the DER bytes of the
/// certificate for reuse by TLS setup.
pub fn validate_certificate(pem: &[u8]) -> Result<CertificateDer<'static>, CertificateError> {
    if pem.is_empty() {
        return Err(CertificateError::MissingPemBlock);
    }

    let block = first_pem_block(pem).ok_or(CertificateError::BadPemBlock { label: None })?;
    if block.label != CERTIFICATE_LABEL {
        return Err(CertificateError::BadPemBlock {
            label: Some(block.label),
        });
    }

    parse_x509_der(&block.contents)?;
    Ok(CertificateDer::from(block.contents))
}

/// Find and decode the first well-formed PEM block in `input`.
///
/// Bytes before the BEGIN line and after the END line are ignored, and need
/// not be UTF-8. A block whose END label differs from its BEGIN label, or
/// whose body does not decode, is skipped and the search resumes after it.
fn first_pem_block(input: &[u8]) -> Option<Pem> {
    let mut offset = 0;
    while let Some(found) = find(&input[offset..], PEM_BEGIN) {
        let start = offset + found;
        let at_line_start = start == 0 || input[start - 1] == b'\n';
        if at_line_start {
            if let Some(pem) = decode_pem_block(&input[start..]) {
                return Some(pem);
            }
        }
        offset = start + PEM_BEGIN.len();
    }
    None
}

/// Decode the block starting at `candidate`, which begins with a BEGIN line.
fn decode_pem_block(candidate: &[u8]) -> Option<Pem> {
    let end = find(candidate, PEM_END)?;
    let label_start = end + PEM_END.len();
    let label_len = find(&candidate[label_start..], PEM_DASHES)?;
    let end_label = &candidate[label_start..label_start + label_len];
    let block_len = label_start + label_len + PEM_DASHES.len();

    let (_, pem) = parse_x509_pem(&candidate[..block_len]).ok()?;
    (pem.label.as_bytes() == end_label).then_some(pem)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse DER bytes as exactly one X.509 certificate.
fn parse_x509_der(der: &[u8]) -> Result<X509Certificate<'_>, CertificateError> {
    let (rest, cert) =
        X509Certificate::from_der(der).map_err(|e| CertificateError::X509(e.to_string()))?;
    if !rest.is_empty() {
        return Err(CertificateError::TrailingData(rest.len()));
    }
    Ok(cert)
}

/// A mutual TLS client identity: certificate chain plus matching private key.
///
/// Only constructed by [`parse_client_key_pair`], so holding one means both
/// halves were present and the key matches the leaf certificate.
#[derive(Debug)]
pub struct ClientIdentity {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    /// Certificate chain, leaf first.
    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }

    /// The leaf certificate presented to the server.
    pub fn leaf(&self) -> &CertificateDer<'static> {
        // Non-empty by construction
        &self.cert_chain[0]
    }
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            cert_chain: self.cert_chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

/// Parse a PEM certificate chain and PEM private key into a matched pair.
///
/// Every `CERTIFICATE` block in `cert_pem` is taken, leaf first. The first
/// private key in `key_pem` is used; PKCS#8, PKCS#1 (RSA) and SEC1 (EC) are
/// accepted. The key must correspond to the leaf's public key.
///
/// The match is decided by comparing the public key carried in the private
/// key encoding with the leaf's subject public key, so any key size or curve
/// is accepted. Keys that do not carry their public half (Ed25519 in PKCS#8
/// v1, SEC1 without the optional `publicKey`) are loaded as signing keys
/// instead, which limits them to the algorithms rustls can sign with.
pub fn parse_client_key_pair(
    cert_pem: &[u8],
    key_pem: &[u8],
) -> Result<ClientIdentity, CertificateError> {
    let cert_chain = rustls_pemfile::certs(&mut Cursor::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()?;
    let Some(leaf) = cert_chain.first() else {
        return Err(CertificateError::NoCertificates);
    };

    let key = {
        let leaf = parse_x509_der(leaf)?;
        let key = rustls_pemfile::private_key(&mut Cursor::new(key_pem))?
            .ok_or(CertificateError::NoPrivateKey)?;

        match public_half(&key)? {
            Some(half) => half.check_against(&leaf)?,
            None => check_with_signing_key(&leaf, &cert_chain, &key)?,
        }
        key
    };

    Ok(ClientIdentity { cert_chain, key })
}

/// Public key material recovered from a private key encoding.
enum PublicHalf<'a> {
    Rsa { modulus: &'a [u8], exponent: &'a [u8] },
    /// SEC1 EC point, or the raw PKCS#8 v2 `publicKey` bits.
    Raw(&'a [u8]),
}

impl PublicHalf<'_> {
    fn check_against(&self, leaf: &X509Certificate<'_>) -> Result<(), CertificateError> {
        let spki = leaf.public_key();
        let matches = match self {
            Self::Rsa { modulus, exponent } => match spki.parsed() {
                Ok(PublicKey::RSA(rsa)) => {
                    unsigned(rsa.modulus) == unsigned(modulus)
                        && unsigned(rsa.exponent) == unsigned(exponent)
                }
                _ => false,
            },
            Self::Raw(bits) => &*spki.subject_public_key.data == *bits,
        };

        if matches {
            Ok(())
        } else {
            Err(CertificateError::KeyMismatch)
        }
    }
}

/// Big-endian integer bytes without sign padding.
fn unsigned(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn public_half<'a>(
    key: &'a PrivateKeyDer<'static>,
) -> Result<Option<PublicHalf<'a>>, CertificateError> {
    match key {
        PrivateKeyDer::Pkcs1(k) => rsa_public_half(k.secret_pkcs1_der()).map(Some),
        PrivateKeyDer::Sec1(k) => ec_public_half(k.secret_sec1_der()),
        PrivateKeyDer::Pkcs8(k) => pkcs8_public_half(k.secret_pkcs8_der()),
        _ => Ok(None),
    }
}

/// RSAPrivateKey ::= SEQUENCE { version, modulus, publicExponent, ... }
fn rsa_public_half(der: &[u8]) -> Result<PublicHalf<'_>, CertificateError> {
    let fields = der_sequence(der)?;
    let [_, modulus, exponent, ..] = fields.as_slice() else {
        return Err(CertificateError::PrivateKey("truncated RSA private key".into()));
    };
    Ok(PublicHalf::Rsa {
        modulus: modulus.as_slice().map_err(malformed_key)?,
        exponent: exponent.as_slice().map_err(malformed_key)?,
    })
}

/// ECPrivateKey ::= SEQUENCE { version, privateKey, [0] parameters, [1] publicKey }
fn ec_public_half(der: &[u8]) -> Result<Option<PublicHalf<'_>>, CertificateError> {
    let fields = der_sequence(der)?;
    let Some(public_key) = context_field(&fields, 1) else {
        return Ok(None);
    };
    // EXPLICIT tagging: the field wraps a complete BIT STRING
    let explicit = public_key.as_slice().map_err(malformed_key)?;
    let (_, bits) = parse_der(explicit).map_err(malformed_key)?;
    Ok(Some(PublicHalf::Raw(bits.as_slice().map_err(malformed_key)?)))
}

/// PrivateKeyInfo ::= SEQUENCE { version, algorithm, privateKey, [0] attributes, [1] publicKey }
fn pkcs8_public_half(der: &[u8]) -> Result<Option<PublicHalf<'_>>, CertificateError> {
    let fields = der_sequence(der)?;
    let [_, algorithm, private_key, optional @ ..] = fields.as_slice() else {
        return Err(CertificateError::PrivateKey("truncated PKCS#8 private key".into()));
    };
    let algorithm = algorithm
        .as_sequence()
        .map_err(malformed_key)?
        .first()
        .ok_or_else(|| CertificateError::PrivateKey("missing key algorithm".into()))?
        .as_oid()
        .map_err(malformed_key)?;
    let inner = private_key.as_slice().map_err(malformed_key)?;

    if *algorithm == OID_PKCS1_RSAENCRYPTION {
        return rsa_public_half(inner).map(Some);
    }
    if *algorithm == OID_KEY_TYPE_EC_PUBLIC_KEY {
        if let Some(half) = ec_public_half(inner)? {
            return Ok(Some(half));
        }
    }

    // IMPLICIT tagging: unused-bits octet, then the key
    let Some(public_key) = context_field(optional, 1) else {
        return Ok(None);
    };
    match public_key.as_slice().map_err(malformed_key)? {
        [0, bits @ ..] => Ok(Some(PublicHalf::Raw(bits))),
        _ => Err(CertificateError::PrivateKey("malformed PKCS#8 public key".into())),
    }
}

fn der_sequence(der: &[u8]) -> Result<Vec<BerObject<'_>>, CertificateError> {
    let (_, object) = parse_der(der).map_err(malformed_key)?;
    match object.content {
        BerObjectContent::Sequence(fields) => Ok(fields),
        _ => Err(CertificateError::PrivateKey("expected a DER sequence".into())),
    }
}

fn context_field<'a, 'b>(fields: &'b [BerObject<'a>], tag: u32) -> Option<&'b BerObject<'a>> {
    fields
        .iter()
        .find(|f| f.header.class() == Class::ContextSpecific && f.header.tag() == Tag(tag))
}

fn malformed_key(e: impl fmt::Display) -> CertificateError {
    CertificateError::PrivateKey(e.to_string())
}

/// Match a key that does not carry its public half by loading it for signing.
fn check_with_signing_key(
    leaf: &X509Certificate<'_>,
    cert_chain: &[CertificateDer<'static>],
    key: &PrivateKeyDer<'static>,
) -> Result<(), CertificateError> {
    let algorithm = &leaf.public_key().algorithm.algorithm;
    let signing_key = rustls::crypto::ring::sign::any_supported_type(key)
        .map_err(|_| CertificateError::UnsupportedKeyAlgorithm(algorithm.to_string()))?;

    match CertifiedKey::new(cert_chain.to_vec(), signing_key).keys_match() {
        Ok(()) => Ok(()),
        Err(rustls::Error::InconsistentKeys(rustls::InconsistentKeys::KeyMismatch)) => {
            Err(CertificateError::KeyMismatch)
        }
        Err(e) => Err(CertificateError::PrivateKey(e.to_string())),
    }
}
