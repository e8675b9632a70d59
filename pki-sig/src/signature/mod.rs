//! Conversion of ECDSA signatures between ASN.1 DER and the raw `r || s` form.
//!
//! General-purpose crypto libraries produce and consume `SEQUENCE { INTEGER r, INTEGER s }`
//! in DER, where each integer is variable length. Cryptographic tokens expect exactly
//! 32 bytes of R followed by 32 bytes of S, zero-padded on the left. [`der_to_raw`] and
//! [`raw_to_der`] convert between the two using caller-provided buffers only.

use pki_sig_macros::{pki_error, pki_export};

use crate::config::{current_strictness, DerStrictness};
use crate::logger::LogContext;

mod der;
mod der_to_raw;
mod raw_to_der;


pub use der_to_raw::{der_to_raw, der_to_raw_with};
pub use raw_to_der::raw_to_der;

/// Width of one raw signature component (R or S) for 256-bit curves.
pub const COMPONENT_LEN: usize = 32;

/// Width of the raw `r || s` signature.
pub const RAW_SIGNATURE_LEN: usize = 2 * COMPONENT_LEN;

/// Longest INTEGER content: a sign byte followed by a full component.
pub const MAX_INTEGER_CONTENT_LEN: usize = COMPONENT_LEN + 1;

/// Longest DER signature: SEQUENCE header plus two INTEGERs that both need a sign byte.
pub const MAX_DER_SIGNATURE_LEN: usize = der::HEADER_LEN + 2 * der::MAX_INTEGER_LEN;

/// Legacy status code for a successful conversion.
pub const STATUS_OK: i32 = 0;

/// Legacy status code for any failed conversion.
pub const STATUS_FAILURE: i32 = -1;

/// Errors returned by the signature converters.
#[pki_error]
pub enum SignatureError {
    /// A required buffer or output argument is missing.
    #[error("a required buffer or output argument is missing")]
    InvalidArgument,
    /// The input is not a DER-encoded `SEQUENCE` of two INTEGERs.
    #[error("malformed DER signature: {reason}")]
    MalformedEncoding {
        /// What was wrong with the encoding.
        reason: &'static str,
    },
    /// The buffer cannot hold the raw input or the produced encoding.
    #[error("buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall {
        /// Bytes needed.
        required: usize,
        /// Bytes provided.
        available: usize,
    },
    /// A raw signature does not have exactly [`RAW_SIGNATURE_LEN`] bytes.
    #[error("invalid raw signature length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },
}

/// Maps a conversion result to the token interface's status codes: [`STATUS_OK`] on success,
/// [`STATUS_FAILURE`] for every error.
#[must_use]
pub const fn status_code<T>(result: &Result<T, SignatureError>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(_) => STATUS_FAILURE,
    }
}

/// An ECDSA signature held as its two fixed-width components.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Object)]
pub struct EcdsaSignature {
    r: [u8; COMPONENT_LEN],
    s: [u8; COMPONENT_LEN],
}

impl EcdsaSignature {
    /// Creates a signature from big-endian, zero-padded R and S.
    #[must_use]
    pub const fn new(r: [u8; COMPONENT_LEN], s: [u8; COMPONENT_LEN]) -> Self {
        Self { r, s }
    }

    /// The R component.
    #[must_use]
    pub const fn r(&self) -> &[u8; COMPONENT_LEN] {
        &self.r
    }

    /// The S component.
    #[must_use]
    pub const fn s(&self) -> &[u8; COMPONENT_LEN] {
        &self.s
    }

    /// Parses a raw `r || s` signature.
    ///
    /// # Errors
    /// [`SignatureError::InvalidLength`] if `raw` is not exactly [`RAW_SIGNATURE_LEN`] bytes.
    pub fn from_raw(raw: &[u8]) -> Result<Self, SignatureError> {
        let raw_array: &[u8; RAW_SIGNATURE_LEN] =
            raw.try_into().map_err(|_| SignatureError::InvalidLength {
                expected: RAW_SIGNATURE_LEN,
                actual: raw.len(),
            })?;
        Ok(Self::from_raw_array(raw_array))
    }

    /// Parses a DER-encoded signature.
    ///
    /// # Errors
    /// [`SignatureError::MalformedEncoding`] if `der` is rejected at the given strictness.
    pub fn from_der(der: &[u8], strictness: DerStrictness) -> Result<Self, SignatureError> {
        let mut raw = [0u8; RAW_SIGNATURE_LEN];
        der_to_raw_with(Some(&mut raw), Some(der), strictness)?;
        Ok(Self::from_raw_array(&raw))
    }

    /// The raw `r || s` form.
    #[must_use]
    pub fn to_raw(&self) -> [u8; RAW_SIGNATURE_LEN] {
        let mut raw = [0u8; RAW_SIGNATURE_LEN];
        raw[..COMPONENT_LEN].copy_from_slice(&self.r);
        raw[COMPONENT_LEN..].copy_from_slice(&self.s);
        raw
    }

    /// The DER encoding, at most [`MAX_DER_SIGNATURE_LEN`] bytes.
    #[must_use]
    pub fn to_der(&self) -> Vec<u8> {
        let (der, len) = raw_to_der::encode(&self.to_raw());
        der[..len].to_vec()
    }

    fn from_raw_array(raw: &[u8; RAW_SIGNATURE_LEN]) -> Self {
        let mut r = [0u8; COMPONENT_LEN];
        let mut s = [0u8; COMPONENT_LEN];
        r.copy_from_slice(&raw[..COMPONENT_LEN]);
        s.copy_from_slice(&raw[COMPONENT_LEN..]);
        Self { r, s }
    }
}

#[pki_export]
impl EcdsaSignature {
    /// Parses a DER-encoded signature using the configured strictness.
    ///
    /// # Errors
    /// [`SignatureError::MalformedEncoding`] if the encoding is rejected.
    #[uniffi::constructor]
    pub fn from_der_bytes(der: Vec<u8>) -> Result<Self, SignatureError> {
        Self::from_der(&der, current_strictness())
            .inspect_err(|err| crate::debug!("rejected DER signature: {err}"))
    }

    /// Parses a 64-byte raw signature.
    ///
    /// # Errors
    /// [`SignatureError::InvalidLength`] if `raw` is not 64 bytes.
    #[uniffi::constructor]
    pub fn from_raw_bytes(raw: Vec<u8>) -> Result<Self, SignatureError> {
        Self::from_raw(&raw).inspect_err(|err| crate::debug!("rejected raw signature: {err}"))
    }

    /// Parses a hex-encoded raw signature, with or without a `0x` prefix.
    ///
    /// # Errors
    /// - [`SignatureError::Generic`] if `hex_str` is not valid hex.
    /// - [`SignatureError::InvalidLength`] if it does not decode to 64 bytes.
    #[uniffi::constructor]
    pub fn from_hex(hex_str: &str) -> Result<Self, SignatureError> {
        let raw = hex::decode(hex_str.trim_start_matches("0x"))
            .context("raw signature is not valid hex")?;
        Self::from_raw(&raw)
    }

    /// The R component as bytes.
    #[must_use]
    pub fn r_bytes(&self) -> Vec<u8> {
        self.r.to_vec()
    }

    /// The S component as bytes.
    #[must_use]
    pub fn s_bytes(&self) -> Vec<u8> {
        self.s.to_vec()
    }

    /// The raw `r || s` form as bytes.
    #[must_use]
    pub fn raw_bytes(&self) -> Vec<u8> {
        self.to_raw().to_vec()
    }

    /// The DER encoding as bytes.
    #[must_use]
    pub fn der_bytes(&self) -> Vec<u8> {
        self.to_der()
    }

    /// The raw form as lower-case hex, without prefix.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for EcdsaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_raw()))
    }
}

/// Converts a DER-encoded signature into the 64-byte raw form for a token.
///
/// Foreign-facing counterpart of [`der_to_raw_with`], using the configured strictness.
///
/// # Errors
/// - [`SignatureError::InvalidArgument`] if `der` is absent.
/// - [`SignatureError::MalformedEncoding`] if the encoding is rejected.
#[uniffi::export]
pub fn der_signature_to_raw(der: Option<Vec<u8>>) -> Result<Vec<u8>, SignatureError> {
    let _ctx = LogContext::new("SignatureCodec");
    let mut raw = [0u8; RAW_SIGNATURE_LEN];
    der_to_raw_with(Some(&mut raw), der.as_deref(), current_strictness())
        .inspect_err(|err| crate::debug!("DER to raw conversion failed: {err}"))?;
    Ok(raw.to_vec())
}

/// Converts a 64-byte raw token signature into DER.
///
/// Foreign-facing counterpart of [`raw_to_der`]: the raw bytes are grown to
/// [`MAX_DER_SIGNATURE_LEN`] and re-encoded in place.
///
/// # Errors
/// - [`SignatureError::InvalidArgument`] if `raw` is absent.
/// - [`SignatureError::InvalidLength`] if `raw` is not 64 bytes.
#[uniffi::export]
pub fn raw_signature_to_der(raw: Option<Vec<u8>>) -> Result<Vec<u8>, SignatureError> {
    let _ctx = LogContext::new("SignatureCodec");
    let Some(mut buffer) = raw else {
        crate::debug!("raw to DER conversion called without a signature");
        return Err(SignatureError::InvalidArgument);
    };
    if buffer.len() != RAW_SIGNATURE_LEN {
        crate::debug!("raw signature has {} bytes", buffer.len());
        return Err(SignatureError::InvalidLength {
            expected: RAW_SIGNATURE_LEN,
            actual: buffer.len(),
        });
    }

    buffer.resize(MAX_DER_SIGNATURE_LEN, 0);
    let mut len = 0;
    raw_to_der(Some(buffer.as_mut_slice()), Some(&mut len))?;
    buffer.truncate(len);
    Ok(buffer)
}
