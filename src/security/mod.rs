//! Security Access (0x27) seed-key derivation
//!
//! An ECU grants elevated privileges through a challenge/response handshake:
//! the tester requests a seed, derives a key from it with a per-ECU secret,
//! and submits the key at the next sub-function level. The derivation is a
//! pure function; the algorithm in use is selected by a numeric id carried
//! in the vehicle configuration tables.

pub mod ford;

use thiserror::Error;

/// Errors from key derivation and algorithm selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// The configuration names an algorithm id this crate does not know.
    #[error("unknown security algorithm id {0}")]
    UnknownAlgorithm(u16),

    /// Vehicle key material has the wrong shape for the selected algorithm.
    #[error("invalid vehicle key material: {0}")]
    InvalidKeyMaterial(String),

    /// The session seed from the ECU has the wrong length.
    #[error("invalid session seed length {0}, expected {1}")]
    InvalidSeedLength(usize, usize),
}

/// A deterministic seed-to-key transform for one security level.
///
/// Implementations must be bit-exact: any deviation changes every derived
/// key and the ECU will reject the handshake with InvalidKey.
pub trait SeedKeyAlgorithm: Send + Sync {
    /// Derive the 3-byte key for a session seed obtained from the ECU.
    fn compute(&self, session_seed: &[u8]) -> Result<[u8; 3], SecurityError>;
}

/// Algorithm id for the Ford Common ISO 14229 transform.
pub const ALGORITHM_FORD_COMMON_14229: u16 = 70;

/// Instantiate the seed-key algorithm identified by `id`.
///
/// `key_material` is the per-ECU vehicle secret as stored in configuration
/// tables: 5 bytes, or 6 bytes with a zero pad byte at the end.
pub fn algorithm(
    id: u16,
    key_material: &[u8],
) -> Result<Box<dyn SeedKeyAlgorithm>, SecurityError> {
    match id {
        ALGORITHM_FORD_COMMON_14229 => Ok(Box::new(ford::SeedKey::new(key_material)?)),
        other => Err(SecurityError::UnknownAlgorithm(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_algorithm_resolves() {
        let algo = algorithm(ALGORITHM_FORD_COMMON_14229, &[0x4B, 0x30, 0x32, 0x31, 0x36]);
        assert!(algo.is_ok());
    }

    #[test]
    fn unknown_algorithm_rejected() {
        match algorithm(71, &[0; 5]) {
            Err(SecurityError::UnknownAlgorithm(71)) => {}
            other => panic!("expected UnknownAlgorithm, got {:?}", other.err()),
        }
    }

    #[test]
    fn padded_key_material_accepted() {
        // Configuration tables store 6 bytes with a trailing zero pad.
        let algo = algorithm(
            ALGORITHM_FORD_COMMON_14229,
            &[0x4B, 0x30, 0x32, 0x31, 0x36, 0x00],
        );
        assert!(algo.is_ok());
    }
}
