//! Canonicalizes the three pubkey encodings NUT-11 locking accepts from API
//! callers into one 66-hex-character compressed SEC1 form.

use bitcoin::bech32;
use nutvault_common::AppError;

const NPUB_HRP: &str = "npub";

/// Normalizes `input` to a 66-character hex compressed pubkey (`02`/`03`
/// prefix + 32-byte x-only value), or fails with a validation error.
///
/// No curve-point validation is performed; an invalid point is the mint's
/// problem to reject, not ours (spec §4.2).
pub fn normalize_pubkey(input: &str) -> Result<String, AppError> {
    if input.starts_with(NPUB_HRP) {
        return normalize_npub(input);
    }

    match input.len() {
        64 => {
            validate_hex(input)?;
            Ok(format!("02{input}"))
        }
        66 => {
            validate_hex(input)?;
            Ok(input.to_lowercase())
        }
        other => Err(AppError::validation(format!(
            "pubkey must be 64 or 66 hex characters or an npub, got {other} characters"
        ))),
    }
}

fn normalize_npub(input: &str) -> Result<String, AppError> {
    let (hrp, data) =
        bech32::decode(input).map_err(|e| AppError::validation(format!("invalid npub: {e}")))?;

    if !hrp.as_str().eq_ignore_ascii_case(NPUB_HRP) {
        return Err(AppError::validation(format!(
            "expected an npub, got bech32 prefix `{}`",
            hrp.as_str()
        )));
    }
    if data.len() != 32 {
        return Err(AppError::validation(format!(
            "npub must decode to 32 bytes, got {}",
            data.len()
        )));
    }

    Ok(format!("02{}", hex::encode(data)))
}

fn validate_hex(s: &str) -> Result<(), AppError> {
    if s.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(AppError::validation(format!("`{s}` is not valid hex")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X_ONLY: &str = "4d4b4a8a5e4e3c35c2e8a1b5e3f1a4c3b6e7f8a9d0c1e2f3a4b5c6d7e8f9a0b1";

    #[test]
    fn x_only_hex_gets_02_prefix() {
        assert_eq!(normalize_pubkey(X_ONLY).unwrap(), format!("02{X_ONLY}"));
    }

    #[test]
    fn already_prefixed_02_is_unchanged() {
        let with_prefix = format!("02{X_ONLY}");
        assert_eq!(normalize_pubkey(&with_prefix).unwrap(), with_prefix);
    }

    #[test]
    fn already_prefixed_03_is_unchanged() {
        let with_prefix = format!("03{X_ONLY}");
        assert_eq!(normalize_pubkey(&with_prefix).unwrap(), with_prefix);
    }

    #[test]
    fn npub_decodes_to_02_prefixed_hex() {
        let data: Vec<u8> = (0..32u8).collect();
        let hrp = bech32::Hrp::parse(NPUB_HRP).unwrap();
        let encoded = bech32::encode::<bech32::Bech32>(hrp, &data).unwrap();
        let normalized = normalize_pubkey(&encoded).unwrap();
        assert_eq!(normalized, format!("02{}", hex::encode(&data)));
    }

    #[test]
    fn rejects_wrong_lengths() {
        for bad in ["", "ab", &"a".repeat(8), &"a".repeat(65)] {
            assert!(normalize_pubkey(bad).is_err(), "expected `{bad}` to fail");
        }
    }

    #[test]
    fn rejects_non_hex_at_valid_length() {
        let bad = "z".repeat(64);
        assert!(normalize_pubkey(&bad).is_err());
    }
}
