//! Hex payload validation and conversion.

use crate::PlaybackError;

/// Shortest hex payload accepted as audio (50 bytes).
pub const MIN_HEX_LEN: usize = 100;

/// Check that `hex` looks like an audio payload.
///
/// Accepts only non-empty, even-length strings of `[0-9a-fA-F]` that are at
/// least [`MIN_HEX_LEN`] characters long. The length floor is a size guard
/// against truncated payloads, not a format check.
pub fn is_valid_hex_string(hex: &str) -> bool {
    if hex.is_empty() {
        return false;
    }

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    if hex.len() % 2 != 0 {
        return false;
    }

    hex.len() >= MIN_HEX_LEN
}

/// Convert a validated hex payload to bytes.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, PlaybackError> {
    if !is_valid_hex_string(hex) {
        return Err(PlaybackError::InvalidHex);
    }

    decode_hex_pairs(hex)
}

/// Decode `hex` two characters at a time, without the payload size guard.
pub fn decode_hex_pairs(hex: &str) -> Result<Vec<u8>, PlaybackError> {
    if hex.len() % 2 != 0 {
        return Err(PlaybackError::HexConversion(format!(
            "odd number of digits ({})",
            hex.len()
        )));
    }

    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair)
                .map_err(|e| PlaybackError::HexConversion(e.to_string()))?;
            u8::from_str_radix(digits, 16)
                .map_err(|e| PlaybackError::HexConversion(format!("'{}': {}", digits, e)))
        })
        .collect()
}
