use crate::config::DerStrictness;

use super::der::{place_component, read_integer, read_sequence_header, HEADER_LEN};
use super::{SignatureError, COMPONENT_LEN, RAW_SIGNATURE_LEN};

/// Converts a DER-encoded `SEQUENCE { INTEGER r, INTEGER s }` into the 64-byte raw `r || s` form,
/// validating the encoding strictly.
///
/// See [`der_to_raw_with`].
///
/// # Errors
/// - [`SignatureError::InvalidArgument`] if either argument is `None`.
/// - [`SignatureError::MalformedEncoding`] if `in_der` is not a well-formed signature.
pub fn der_to_raw(
    out_raw: Option<&mut [u8; RAW_SIGNATURE_LEN]>,
    in_der: Option<&[u8]>,
) -> Result<(), SignatureError> {
    der_to_raw_with(out_raw, in_der, DerStrictness::Strict)
}

/// Converts a DER-encoded signature into the raw form using the given validation level.
///
/// Each INTEGER is written right-aligned into its 32-byte slot: a 33-byte integer loses its
/// leading sign byte, a shorter one is zero-padded on the left. Bytes after the S integer are
/// ignored. `out_raw` is only written when the whole conversion succeeds.
///
/// # Errors
/// - [`SignatureError::InvalidArgument`] if either argument is `None`.
/// - [`SignatureError::MalformedEncoding`] if the input is truncated, an INTEGER is longer than
///   33 bytes, or (strict only) tags, lengths or sign bytes are not canonical DER.
///
/// # Examples
///
/// ```rust
/// use pki_sig::config::DerStrictness;
/// use pki_sig::signature::der_to_raw_with;
///
/// let der = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
/// let mut raw = [0u8; 64];
/// der_to_raw_with(Some(&mut raw), Some(&der[..]), DerStrictness::Strict).unwrap();
/// assert_eq!(raw[31], 0x01);
/// assert_eq!(raw[63], 0x02);
/// ```
pub fn der_to_raw_with(
    out_raw: Option<&mut [u8; RAW_SIGNATURE_LEN]>,
    in_der: Option<&[u8]>,
    strictness: DerStrictness,
) -> Result<(), SignatureError> {
    let (Some(out_raw), Some(in_der)) = (out_raw, in_der) else {
        return Err(SignatureError::InvalidArgument);
    };

    *out_raw = decode(in_der, strictness)?;
    Ok(())
}

fn decode(der: &[u8], strictness: DerStrictness) -> Result<[u8; RAW_SIGNATURE_LEN], SignatureError> {
    let sequence_len = read_sequence_header(der, strictness)?;
    let (r, s_offset) = read_integer(der, HEADER_LEN, strictness)?;
    let (s, end) = read_integer(der, s_offset, strictness)?;

    if strictness == DerStrictness::Strict && end - HEADER_LEN != sequence_len {
        return Err(SignatureError::MalformedEncoding {
            reason: "SEQUENCE length does not match its INTEGERs",
        });
    }

    let mut raw = [0u8; RAW_SIGNATURE_LEN];
    let (r_slot, s_slot) = raw.split_at_mut(COMPONENT_LEN);
    place_component(r, r_slot, strictness)?;
    place_component(s, s_slot, strictness)?;
    Ok(raw)
}
