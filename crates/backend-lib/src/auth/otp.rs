// ============================
// crates/backend-lib/src/auth/otp.rs
// ============================
//! One-time verification codes.
use rand::{rngs::OsRng, Rng};

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Draw a uniform 6-digit decimal code from the OS CSPRNG
pub fn generate_code() -> String {
    OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}
