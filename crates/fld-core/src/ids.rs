//! ID prefix constants and generation.
//!
//! IDs are a three-letter prefix, a dash, and eight lowercase hex characters,
//! e.g. `bat-a3f8b2c1`.

use crate::errors::CoreError;

pub const PREFIX_BATCH: &str = "bat";
pub const PREFIX_OTP: &str = "otp";

pub const ALL_PREFIXES: &[&str] = &[PREFIX_BATCH, PREFIX_OTP];

/// Generate a prefixed random ID.
///
/// # Errors
///
/// Returns [`CoreError::Entropy`] if the OS random source is unavailable.
pub fn generate(prefix: &str) -> Result<String, CoreError> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes).map_err(|e| CoreError::Entropy(e.to_string()))?;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("{prefix}-{hex}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_prefix_and_hex_suffix() {
        for prefix in ALL_PREFIXES {
            let id = generate(prefix).unwrap();
            assert_eq!(id.len(), 12, "ID should be 12 chars: {id}");
            assert!(id.starts_with(&format!("{prefix}-")));
            assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn generated_ids_differ() {
        let a = generate(PREFIX_BATCH).unwrap();
        let b = generate(PREFIX_BATCH).unwrap();
        assert_ne!(a, b);
    }
}
