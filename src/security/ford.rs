//! Ford Common ISO 14229 seed-key transform
//!
//! A linear-feedback-shift-register-style derivation over a 24-bit
//! accumulator. The challenge is the 3-byte session seed followed by the
//! 5-byte vehicle secret; each challenge bit (LSB first within each byte)
//! conditions a feedback term mixed against two fixed constants. The 3-byte
//! key is extracted from fixed slices of the final accumulator.

use super::{SecurityError, SeedKeyAlgorithm};

const INITIAL: u32 = 0x00C5_41A9;
const V1: u32 = 0x0010_9028;
const V2: u32 = 0xFFEF_6FD7;

const SECRET_LEN: usize = 5;
const SEED_LEN: usize = 3;

/// Seed-key transform parameterized by a per-ECU 5-byte vehicle secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedKey {
    vehicle_secret: [u8; SECRET_LEN],
}

impl SeedKey {
    /// Build from vehicle key material: 5 bytes, or 6 bytes where the last
    /// is a zero pad (the layout used by configuration tables).
    pub fn new(key_material: &[u8]) -> Result<Self, SecurityError> {
        match key_material.len() {
            SECRET_LEN => {}
            6 if key_material[5] == 0 => {}
            6 => {
                return Err(SecurityError::InvalidKeyMaterial(
                    "6-byte key material must end with a zero pad byte".into(),
                ))
            }
            n => {
                return Err(SecurityError::InvalidKeyMaterial(format!(
                    "expected 5 or 6 bytes, got {n}"
                )))
            }
        }
        let mut vehicle_secret = [0u8; SECRET_LEN];
        vehicle_secret.copy_from_slice(&key_material[..SECRET_LEN]);
        Ok(Self { vehicle_secret })
    }

    fn derive(&self, session_seed: &[u8; SEED_LEN]) -> [u8; 3] {
        let mut challenge = [0u8; 8];
        challenge[..SEED_LEN].copy_from_slice(session_seed);
        challenge[SEED_LEN..].copy_from_slice(&self.vehicle_secret);

        let mut acc = INITIAL;
        for &byte in &challenge {
            let mut b = u32::from(byte);
            for _ in 0..8 {
                let mut feedback = 0;
                if (b ^ acc) & 0x1 != 0 {
                    acc |= 0x0100_0000;
                    feedback = V1;
                }
                b >>= 1;
                feedback ^= acc >> 1;
                feedback &= V1;
                feedback |= V2 & (acc >> 1);
                acc = feedback & 0x00FF_FFFF;
            }
        }

        [
            ((acc >> 4) & 0xFF) as u8,
            (((acc >> 20) & 0x0F) + ((acc >> 8) & 0xF0)) as u8,
            (((acc << 4) & 0xFF) + ((acc >> 16) & 0x0F)) as u8,
        ]
    }
}

impl SeedKeyAlgorithm for SeedKey {
    fn compute(&self, session_seed: &[u8]) -> Result<[u8; 3], SecurityError> {
        let seed: &[u8; SEED_LEN] = session_seed
            .try_into()
            .map_err(|_| SecurityError::InvalidSeedLength(session_seed.len(), SEED_LEN))?;
        Ok(self.derive(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_for(secret: [u8; 5], seed: [u8; 3]) -> [u8; 3] {
        SeedKey::new(&secret).unwrap().compute(&seed).unwrap()
    }

    // Vectors recorded from a known-good tester session.
    #[test]
    fn known_answer_vectors() {
        assert_eq!(
            key_for([0x4B, 0x30, 0x32, 0x31, 0x36], [0x11, 0x22, 0x33]),
            [0xBF, 0x77, 0x9C]
        );
        assert_eq!(
            key_for([0x4B, 0x30, 0x32, 0x31, 0x36], [0x00, 0x00, 0x00]),
            [0xDE, 0x9F, 0x9D]
        );
        assert_eq!(
            key_for([0x4B, 0x30, 0x32, 0x31, 0x36], [0xFF, 0xFF, 0xFF]),
            [0xB5, 0x62, 0x44]
        );
        assert_eq!(
            key_for([0x49, 0x76, 0x66, 0x65, 0x52], [0x11, 0x22, 0x33]),
            [0x07, 0x62, 0x53]
        );
        assert_eq!(
            key_for([0x4E, 0x53, 0x59, 0x4E, 0x53], [0xA5, 0x5A, 0x77]),
            [0xD0, 0x21, 0xD1]
        );
    }

    #[test]
    fn deterministic() {
        let algo = SeedKey::new(&[0x4B, 0x30, 0x32, 0x31, 0x36]).unwrap();
        let a = algo.compute(&[0x01, 0x02, 0x03]).unwrap();
        let b = algo.compute(&[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_change_changes_key() {
        // Adjacent seeds must not collide.
        assert_ne!(
            key_for([0x4B, 0x30, 0x32, 0x31, 0x36], [0x11, 0x22, 0x33]),
            key_for([0x4B, 0x30, 0x32, 0x31, 0x36], [0x11, 0x22, 0x34])
        );
    }

    #[test]
    fn secret_change_changes_key() {
        assert_ne!(
            key_for([0x4B, 0x30, 0x32, 0x31, 0x36], [0x11, 0x22, 0x33]),
            key_for([0x49, 0x76, 0x66, 0x65, 0x52], [0x11, 0x22, 0x33])
        );
    }

    #[test]
    fn wrong_seed_length_rejected() {
        let algo = SeedKey::new(&[0; 5]).unwrap();
        assert_eq!(
            algo.compute(&[0x01, 0x02]),
            Err(SecurityError::InvalidSeedLength(2, 3))
        );
    }

    #[test]
    fn wrong_secret_length_rejected() {
        assert!(matches!(
            SeedKey::new(&[0; 4]),
            Err(SecurityError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            SeedKey::new(&[1, 2, 3, 4, 5, 6]),
            Err(SecurityError::InvalidKeyMaterial(_))
        ));
    }
}
