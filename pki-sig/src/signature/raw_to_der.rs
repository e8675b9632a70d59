use super::der::{short_form_len, write_integer, HEADER_LEN, SEQUENCE_TAG};
use super::{SignatureError, COMPONENT_LEN, MAX_DER_SIGNATURE_LEN, RAW_SIGNATURE_LEN};

/// Re-encodes, in place, the 64-byte raw `r || s` signature at the start of `buffer` as a
/// DER `SEQUENCE { INTEGER r, INTEGER s }` and stores the encoded length in `out_len`.
///
/// Leading zero bytes of each component are trimmed and a `0x00` sign byte is inserted when
/// the remaining first byte has its high bit set. The encoding can be up to
/// [`MAX_DER_SIGNATURE_LEN`] bytes, so `buffer` should have spare capacity past the raw input.
/// Bytes of `buffer` after `out_len` are left as they were.
///
/// # Errors
/// - [`SignatureError::InvalidArgument`] if either argument is `None`.
/// - [`SignatureError::BufferTooSmall`] if `buffer` is shorter than the raw signature or than
///   the produced encoding. Nothing is written in that case.
///
/// # Examples
///
/// ```rust
/// use pki_sig::signature::raw_to_der;
///
/// let mut buffer = [0u8; 72];
/// buffer[31] = 0x01;
/// buffer[63] = 0x80;
/// let mut len = 0;
/// raw_to_der(Some(&mut buffer[..]), Some(&mut len)).unwrap();
/// assert_eq!(&buffer[..len], &[0x30, 0x07, 0x02, 0x01, 0x01, 0x02, 0x02, 0x00, 0x80]);
/// ```
pub fn raw_to_der(
    buffer: Option<&mut [u8]>,
    out_len: Option<&mut usize>,
) -> Result<(), SignatureError> {
    let (Some(buffer), Some(out_len)) = (buffer, out_len) else {
        return Err(SignatureError::InvalidArgument);
    };

    let available = buffer.len();
    let Some(raw) = buffer.first_chunk::<RAW_SIGNATURE_LEN>() else {
        return Err(SignatureError::BufferTooSmall {
            required: RAW_SIGNATURE_LEN,
            available,
        });
    };

    let (der, len) = encode(raw);
    if len > available {
        return Err(SignatureError::BufferTooSmall {
            required: len,
            available,
        });
    }

    buffer[..len].copy_from_slice(&der[..len]);
    *out_len = len;
    Ok(())
}

/// Encodes a raw signature into a scratch array, returning it with the encoded length.
pub(crate) fn encode(raw: &[u8; RAW_SIGNATURE_LEN]) -> ([u8; MAX_DER_SIGNATURE_LEN], usize) {
    let (r, s) = raw.split_at(COMPONENT_LEN);
    let mut der = [0u8; MAX_DER_SIGNATURE_LEN];

    let mut offset = HEADER_LEN;
    offset += write_integer(r, &mut der[offset..]);
    offset += write_integer(s, &mut der[offset..]);

    der[0] = SEQUENCE_TAG;
    der[1] = short_form_len(offset - HEADER_LEN);
    (der, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const R_HIGH_BIT: &str = "b6d004231cef7ffef41010be43261607e3bec61e48f8fd7af3124f1a1d4f44a0";
    const R_LOW_BIT: &str = "36d004231cef7ffef41010be43261607e3bec61e48f8fd7af3124f1a1d4f44a0";
    const S_HIGH_BIT: &str = "d1efb3b0da4efd05a1b664fba53659e0c83afe218832c7a03ef3436dfa349ed6";
    const S_LOW_BIT: &str = "513fb3b0da4efd05a1b664fba53659e0c83afe218832c7a03ef3436dfa349ed6";

    /// Raw signature followed by eight bytes of spare capacity.
    fn token_buffer(r: &str, s: &str) -> Vec<u8> {
        let mut buffer = hex::decode(format!("{r}{s}")).unwrap();
        buffer.resize(MAX_DER_SIGNATURE_LEN, 0);
        buffer
    }

    fn convert(buffer: &mut [u8]) -> usize {
        let mut len = 0;
        raw_to_der(Some(buffer), Some(&mut len)).unwrap();
        len
    }

    #[test]
    fn test_raw_to_der_happy_path() {
        let mut buffer = token_buffer(R_HIGH_BIT, S_HIGH_BIT);

        let len = convert(&mut buffer);

        let expected = hex::decode(format!("3046022100{R_HIGH_BIT}022100{S_HIGH_BIT}")).unwrap();
        assert_eq!(len, 72);
        assert_eq!(&buffer[..len], expected.as_slice());
    }

    #[test]
    fn test_raw_to_der_r_without_sign_byte() {
        let mut buffer = token_buffer(R_LOW_BIT, S_HIGH_BIT);

        let len = convert(&mut buffer);

        let expected = hex::decode(format!("30450220{R_LOW_BIT}022100{S_HIGH_BIT}")).unwrap();
        assert_eq!(len, 71);
        assert_eq!(&buffer[..len], expected.as_slice());
    }

    #[test]
    fn test_raw_to_der_s_without_sign_byte() {
        let mut buffer = token_buffer(R_HIGH_BIT, S_LOW_BIT);

        let len = convert(&mut buffer);

        let expected = hex::decode(format!("3045022100{R_HIGH_BIT}0220{S_LOW_BIT}")).unwrap();
        assert_eq!(len, 71);
        assert_eq!(&buffer[..len], expected.as_slice());
    }

    #[test]
    fn test_raw_to_der_trims_leading_zeros() {
        let r = format!("0000{}", &R_LOW_BIT[4..]);
        let s = format!("{}01", "00".repeat(31));
        let mut buffer = token_buffer(&r, &s);

        let len = convert(&mut buffer);

        let expected = hex::decode(format!("3023021e{}020101", &R_LOW_BIT[4..])).unwrap();
        assert_eq!(&buffer[..len], expected.as_slice());
        assert_eq!(buffer[3], 0x1e);
    }

    #[test]
    fn test_raw_to_der_trimmed_component_with_high_bit() {
        // After trimming, r starts with 0x80 and still needs a sign byte.
        let r = format!("00{}", "80".repeat(31));
        let mut buffer = token_buffer(&r, S_LOW_BIT);

        let len = convert(&mut buffer);

        assert_eq!(&buffer[..5], &[0x30, 0x44, 0x02, 0x20, 0x00]);
        assert_eq!(buffer[5], 0x80);
        assert_eq!(len, 70);
    }

    #[test]
    fn test_raw_to_der_zero_components() {
        let mut buffer = [0u8; MAX_DER_SIGNATURE_LEN];

        let len = convert(&mut buffer);

        assert_eq!(&buffer[..len], &[0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_raw_to_der_null_arguments() {
        let mut known = [0xaau8];
        let mut len = 7;

        let err = raw_to_der(None, Some(&mut len)).unwrap_err();
        assert!(matches!(err, SignatureError::InvalidArgument));
        assert_eq!(len, 7);

        let err = raw_to_der(Some(&mut known[..]), None).unwrap_err();
        assert!(matches!(err, SignatureError::InvalidArgument));
        assert_eq!(known, [0xaa]);

        let err = raw_to_der(None, None).unwrap_err();
        assert!(matches!(err, SignatureError::InvalidArgument));
    }

    #[test]
    fn test_raw_to_der_rejects_short_input() {
        let mut buffer = [0x01u8; RAW_SIGNATURE_LEN - 1];
        let mut len = 0;

        let err = raw_to_der(Some(&mut buffer[..]), Some(&mut len)).unwrap_err();

        assert!(matches!(
            err,
            SignatureError::BufferTooSmall {
                required: RAW_SIGNATURE_LEN,
                available: 63
            }
        ));
        assert_eq!(len, 0);
    }

    #[test]
    fn test_raw_to_der_rejects_missing_capacity() {
        let mut buffer = hex::decode(format!("{R_HIGH_BIT}{S_HIGH_BIT}")).unwrap();
        let before = buffer.clone();
        let mut len = 0;

        let err = raw_to_der(Some(buffer.as_mut_slice()), Some(&mut len)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "buffer too small: 72 bytes required, 64 available"
        );
        assert_eq!(buffer, before);
        assert_eq!(len, 0);
    }

    #[test]
    fn test_raw_to_der_fits_exactly_without_spare_capacity() {
        // Two 31-byte components encode to 2 + 33 + 33 = 68 bytes.
        let component = format!("00{}", "11".repeat(31));
        let mut buffer = hex::decode(format!("{component}{component}")).unwrap();
        buffer.extend_from_slice(&[0xee; 4]);

        let len = convert(&mut buffer);

        assert_eq!(len, 68);
        assert_eq!(&buffer[..4], &[0x30, 0x42, 0x02, 0x1f]);
    }
}
