//! Validation utilities for receipt forms

use base64::{engine::general_purpose::STANDARD, Engine as _};

// ============================================================================
// Quantity Validations
// ============================================================================

/// Clamp a raw stepper value into `[0, available]`
///
/// The stepper hands over whatever the user typed, including negatives.
pub fn clamp_quantity(raw: i64, available: usize) -> usize {
    if raw <= 0 {
        return 0;
    }
    usize::try_from(raw).map_or(available, |q| q.min(available))
}

// ============================================================================
// Signature Validations
// ============================================================================

/// Prefix of the data URL produced by the signature pad
pub const SIGNATURE_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Largest accepted decoded signature image
pub const MAX_SIGNATURE_BYTES: usize = 512 * 1024;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Validate a captured signature (PNG data URL)
pub fn validate_signature(data_url: &str) -> Result<(), &'static str> {
    let encoded = data_url
        .strip_prefix(SIGNATURE_DATA_URL_PREFIX)
        .ok_or("Signature must be a PNG data URL")?;

    if encoded.is_empty() {
        return Err("Signature is empty");
    }
    // Rough upper bound before decoding: 4 base64 chars per 3 bytes
    if encoded.len() / 4 * 3 > MAX_SIGNATURE_BYTES {
        return Err("Signature image is too large");
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| "Signature is not valid base64")?;

    if !bytes.starts_with(PNG_MAGIC) {
        return Err("Signature is not a PNG image");
    }
    Ok(())
}

/// Wrap raw PNG bytes as a signature data URL
pub fn signature_data_url(png: &[u8]) -> String {
    format!("{}{}", SIGNATURE_DATA_URL_PREFIX, STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(b"\0\0\0\rIHDR");
        bytes
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(-3, 5), 0);
        assert_eq!(clamp_quantity(0, 5), 0);
        assert_eq!(clamp_quantity(3, 5), 3);
        assert_eq!(clamp_quantity(9, 5), 5);
        assert_eq!(clamp_quantity(i64::MAX, 2), 2);
        assert_eq!(clamp_quantity(4, 0), 0);
    }

    #[test]
    fn test_validate_signature_valid() {
        let url = signature_data_url(&tiny_png());
        assert!(url.starts_with(SIGNATURE_DATA_URL_PREFIX));
        assert!(validate_signature(&url).is_ok());
    }

    #[test]
    fn test_validate_signature_invalid() {
        assert!(validate_signature("").is_err());
        assert!(validate_signature("data:image/png;base64,").is_err());
        assert!(validate_signature("data:image/jpeg;base64,AAAA").is_err());
        assert!(validate_signature("data:image/png;base64,***").is_err());
        // Valid base64, not a PNG
        assert!(validate_signature(&signature_data_url(b"GIF89a")).is_err());
    }

    #[test]
    fn test_validate_signature_too_large() {
        let mut png = tiny_png();
        png.resize(MAX_SIGNATURE_BYTES + 1024, 0);
        assert_eq!(
            validate_signature(&signature_data_url(&png)),
            Err("Signature image is too large")
        );
    }
}
