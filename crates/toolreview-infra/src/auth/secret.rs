//! One-time secrets for reset and confirmation links.

use argon2::password_hash::rand_core::{OsRng, RngCore};

use toolreview_core::ports::SecretGenerator;

/// 32 bytes from the OS RNG, hex encoded (64 characters).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSecretGenerator;

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
