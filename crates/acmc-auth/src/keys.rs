//! RSA key material
//!
//! Parsing of PEM-encoded RSA public keys (SPKI `PUBLIC KEY` or PKCS#1
//! `RSA PUBLIC KEY`) and private keys for the client-side signer.

use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use jsonwebtoken::{DecodingKey, EncodingKey};

const PUBLIC_KEY_LABELS: [&str; 2] = ["PUBLIC KEY", "RSA PUBLIC KEY"];
const PRIVATE_KEY_LABELS: [&str; 2] = ["RSA PRIVATE KEY", "PRIVATE KEY"];

/// Smallest RSA modulus the verifier accepts, in bits.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Largest RSA modulus the verifier accepts, in bits.
pub const MAX_MODULUS_BITS: usize = 8192;

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;
const DER_BIT_STRING: u8 = 0x03;

/// A parsed RSA public key.
///
/// # Example
///
/// ```rust,no_run
/// use acmc_auth::RsaPublicKey;
///
/// let pem = std::fs::read_to_string("user_1_public_key.pem").unwrap();
/// let key = RsaPublicKey::from_pem(&pem).unwrap();
/// ```
#[derive(Clone)]
pub struct RsaPublicKey {
    key: DecodingKey,
}

impl std::fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPublicKey").field("key", &"[RSA]").finish()
    }
}

impl RsaPublicKey {
    /// Parse a PEM-encoded RSA public key.
    ///
    /// # Returns
    ///
    /// The key, or `AuthError::InvalidKeyMaterial` if the PEM is malformed,
    /// carries another label, holds a non-RSA key, or has a modulus outside
    /// `MIN_MODULUS_BITS..=MAX_MODULUS_BITS`
    pub fn from_pem(pem: &str) -> AuthResult<Self> {
        let label = expect_label(pem, &PUBLIC_KEY_LABELS)?;
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::InvalidKeyMaterial(format!("parse public key failed: {}", e)))?;

        let bits = modulus_bits(label, &pem_body(pem)?)?;
        if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bits) {
            return Err(AuthError::InvalidKeyMaterial(format!(
                "{}-bit RSA modulus not supported, expected {} to {} bits",
                bits, MIN_MODULUS_BITS, MAX_MODULUS_BITS
            )));
        }

        Ok(Self { key })
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}

/// A parsed RSA private key (PKCS#1 `RSA PRIVATE KEY` or PKCS#8 `PRIVATE KEY`).
#[derive(Clone)]
pub struct RsaPrivateKey {
    key: EncodingKey,
}

impl std::fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateKey").field("key", &"[REDACTED]").finish()
    }
}

impl RsaPrivateKey {
    /// Parse a PEM-encoded RSA private key.
    pub fn from_pem(pem: &str) -> AuthResult<Self> {
        expect_label(pem, &PRIVATE_KEY_LABELS)?;
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::InvalidKeyMaterial(format!("parse private key failed: {}", e)))?;
        Ok(Self { key })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.key
    }
}

/// Label of the first PEM block (`-----BEGIN <label>-----`).
fn pem_label(pem: &str) -> Option<&str> {
    pem.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("-----BEGIN "))
        .and_then(|rest| rest.strip_suffix("-----"))
}

fn expect_label<'a>(pem: &'a str, accepted: &[&str]) -> AuthResult<&'a str> {
    match pem_label(pem) {
        Some(label) if accepted.contains(&label) => Ok(label),
        Some(label) => Err(AuthError::InvalidKeyMaterial(format!(
            "unexpected PEM block {:?}, expected one of {:?}",
            label, accepted
        ))),
        None => Err(AuthError::InvalidKeyMaterial("no PEM block found".to_string())),
    }
}

/// Decoded DER of the first PEM block.
fn pem_body(pem: &str) -> AuthResult<Vec<u8>> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .skip_while(|line| !line.starts_with("-----BEGIN "))
        .skip(1)
        .take_while(|line| !line.starts_with("-----END "))
        .filter(|line| !line.contains(':'))
        .collect();
    STANDARD
        .decode(body)
        .map_err(|e| AuthError::InvalidKeyMaterial(format!("decode PEM body failed: {}", e)))
}

/// Bit length of the modulus of a PKCS#1 (`RSA PUBLIC KEY`) or SPKI
/// (`PUBLIC KEY`) RSA public key.
fn modulus_bits(label: &str, der: &[u8]) -> AuthResult<usize> {
    let malformed = || AuthError::InvalidKeyMaterial("malformed RSA public key structure".to_string());

    let pkcs1 = if label == "RSA PUBLIC KEY" {
        der
    } else {
        // SubjectPublicKeyInfo ::= SEQUENCE { algorithm, BIT STRING }
        let mut spki = DerReader::new(DerReader::new(der).read(DER_SEQUENCE).ok_or_else(malformed)?);
        spki.read(DER_SEQUENCE).ok_or_else(malformed)?;
        match spki.read(DER_BIT_STRING).ok_or_else(malformed)? {
            [0, key @ ..] => key,
            _ => return Err(malformed()),
        }
    };

    // RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }
    let mut rsa = DerReader::new(DerReader::new(pkcs1).read(DER_SEQUENCE).ok_or_else(malformed)?);
    let modulus = rsa.read(DER_INTEGER).ok_or_else(malformed)?;

    let significant = match modulus.iter().position(|&b| b != 0) {
        Some(start) => &modulus[start..],
        None => return Err(malformed()),
    };
    Ok(significant.len() * 8 - significant[0].leading_zeros() as usize)
}

/// Minimal reader over DER tag-length-value elements.
struct DerReader<'a> {
    bytes: &'a [u8],
}

impl<'a> DerReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Contents of the next element, if it carries `tag`.
    fn read(&mut self, tag: u8) -> Option<&'a [u8]> {
        let (&found, rest) = self.bytes.split_first()?;
        if found != tag {
            return None;
        }

        let (&first, mut rest) = rest.split_first()?;
        let len = if first < 0x80 {
            usize::from(first)
        } else {
            let count = usize::from(first & 0x7f);
            if count == 0 || count > 4 || rest.len() < count {
                return None;
            }
            let (len_bytes, after) = rest.split_at(count);
            rest = after;
            len_bytes.iter().fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
        };

        if rest.len() < len {
            return None;
        }
        let (contents, after) = rest.split_at(len);
        self.bytes = after;
        Some(contents)
    }
}
