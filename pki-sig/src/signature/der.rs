//! Length and format helpers shared by both conversion directions.
//!
//! Only the single-byte (short form) DER length is handled: an INTEGER of a
//! 256-bit component never needs more than 33 content bytes and the whole
//! signature never more than 70.

use crate::config::DerStrictness;

use super::{SignatureError, COMPONENT_LEN, MAX_INTEGER_CONTENT_LEN};

pub(crate) const SEQUENCE_TAG: u8 = 0x30;
pub(crate) const INTEGER_TAG: u8 = 0x02;

/// Tag byte plus single length byte.
pub(crate) const HEADER_LEN: usize = 2;

/// Largest encoded INTEGER: header, sign byte and 32 content bytes.
pub(crate) const MAX_INTEGER_LEN: usize = HEADER_LEN + MAX_INTEGER_CONTENT_LEN;

const HIGH_BIT: u8 = 0x80;

const fn has_high_bit(byte: u8) -> bool {
    byte & HIGH_BIT != 0
}

/// Reads the outer `SEQUENCE` header and returns the declared content length.
///
/// Lenient parsing only requires the two header bytes to be present.
pub(crate) fn read_sequence_header(
    der: &[u8],
    strictness: DerStrictness,
) -> Result<usize, SignatureError> {
    let &[tag, len, ..] = der else {
        return Err(malformed("truncated SEQUENCE header"));
    };

    if strictness == DerStrictness::Strict {
        if tag != SEQUENCE_TAG {
            return Err(malformed("outer tag is not SEQUENCE"));
        }
        if has_high_bit(len) {
            return Err(malformed("multi-byte SEQUENCE length is not supported"));
        }
        if usize::from(len) > der.len() - HEADER_LEN {
            return Err(malformed("SEQUENCE length exceeds input"));
        }
    }

    Ok(usize::from(len))
}

/// Reads the INTEGER starting at `offset`.
///
/// Returns its content bytes and the offset just past them.
pub(crate) fn read_integer(
    der: &[u8],
    offset: usize,
    strictness: DerStrictness,
) -> Result<(&[u8], usize), SignatureError> {
    let Some(&[tag, len]) = der.get(offset..offset + HEADER_LEN) else {
        return Err(malformed("truncated INTEGER header"));
    };

    if strictness == DerStrictness::Strict {
        if tag != INTEGER_TAG {
            return Err(malformed("component tag is not INTEGER"));
        }
        if has_high_bit(len) {
            return Err(malformed("multi-byte INTEGER length is not supported"));
        }
    }

    let len = usize::from(len);
    if len > MAX_INTEGER_CONTENT_LEN {
        return Err(malformed("INTEGER is longer than 33 bytes"));
    }

    let start = offset + HEADER_LEN;
    let end = start + len;
    let content = der
        .get(start..end)
        .ok_or_else(|| malformed("INTEGER length exceeds input"))?;

    Ok((content, end))
}

/// Writes INTEGER content into a 32-byte slot, dropping the sign byte and
/// zero-filling the high-order bytes.
///
/// `content` must be at most 33 bytes long, which [`read_integer`] guarantees.
pub(crate) fn place_component(
    content: &[u8],
    slot: &mut [u8],
    strictness: DerStrictness,
) -> Result<(), SignatureError> {
    if strictness == DerStrictness::Strict {
        check_canonical(content)?;
    }

    let value = if content.len() == MAX_INTEGER_CONTENT_LEN {
        &content[1..]
    } else {
        content
    };

    let padding = COMPONENT_LEN - value.len();
    slot[..padding].fill(0);
    slot[padding..].copy_from_slice(value);
    Ok(())
}

fn check_canonical(content: &[u8]) -> Result<(), SignatureError> {
    match content {
        [] => Err(malformed("INTEGER has no content")),
        [first, ..] if has_high_bit(*first) => Err(malformed("INTEGER is negative")),
        [0, second, ..] if !has_high_bit(*second) => {
            Err(malformed("INTEGER has a redundant leading zero"))
        }
        [first, ..] if content.len() == MAX_INTEGER_CONTENT_LEN && *first != 0 => {
            Err(malformed("INTEGER is wider than 256 bits"))
        }
        _ => Ok(()),
    }
}

/// Minimal big-endian form of a component: leading zeros trimmed, at least one byte kept.
pub(crate) fn minimal_integer(component: &[u8]) -> &[u8] {
    let first_significant = component
        .iter()
        .position(|&byte| byte != 0)
        .unwrap_or(component.len().saturating_sub(1));
    &component[first_significant..]
}

/// Encodes a 32-byte component as a DER INTEGER at the start of `out`.
///
/// `out` must hold at least [`MAX_INTEGER_LEN`] bytes. Returns the number of bytes written.
pub(crate) fn write_integer(component: &[u8], out: &mut [u8]) -> usize {
    let value = minimal_integer(component);
    let sign_pad = usize::from(has_high_bit(value[0]));
    let content_len = sign_pad + value.len();

    out[0] = INTEGER_TAG;
    out[1] = short_form_len(content_len);
    out[HEADER_LEN] = 0;
    out[HEADER_LEN + sign_pad..HEADER_LEN + content_len].copy_from_slice(value);

    HEADER_LEN + content_len
}

/// Short-form length byte. Callers only pass lengths below 128.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn short_form_len(len: usize) -> u8 {
    debug_assert!(len < HIGH_BIT as usize);
    len as u8
}

const fn malformed(reason: &'static str) -> SignatureError {
    SignatureError::MalformedEncoding { reason }
}
