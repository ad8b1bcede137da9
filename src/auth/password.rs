use crate::error::AppError;
use bcrypt::{hash, verify};

/// One-way password hashing with bcrypt.
///
/// Each digest embeds a fresh random salt and the work factor, so hashing the same
/// password twice gives two different digests that both verify.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    /// Cost 12: roughly 250ms per verification on commodity hardware.
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    /// Checks `password` against a stored digest.
    ///
    /// A malformed digest is treated as a mismatch.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match verify(password, digest) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Rejecting password check against unreadable digest: {}", e);
                false
            }
        }
    }
}
