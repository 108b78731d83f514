//! Second-factor challenge verification.
//!
//! The protocol only needs a yes/no answer for (seed, submitted code);
//! the code mathematics are a pluggable policy behind
//! [`SecondFactorVerifier`]. The reference policy is a time-windowed
//! one-time code derived from the enrollment seed, tolerant of one
//! adjacent window for clock drift.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SEED_BYTES: usize = 20;

/// Pluggable second-factor policy.
pub trait SecondFactorVerifier: Send + Sync {
    /// Decide whether `code` is valid for `seed` right now.
    fn verify(&self, seed: &str, code: &str) -> bool;
}

/// Time-windowed one-time code verifier.
#[derive(Debug, Clone)]
pub struct TotpVerifier {
    step_seconds: u64,
    digits: u32,
}

impl Default for TotpVerifier {
    fn default() -> Self {
        Self {
            step_seconds: 30,
            digits: 6,
        }
    }
}

impl TotpVerifier {
    pub fn new(step_seconds: u64, digits: u32) -> Self {
        Self {
            step_seconds: step_seconds.max(1),
            // 10^10 overflows u32; the truncated value also caps the
            // usable digits at 10, so clamp to the RFC 4226 range.
            digits: digits.clamp(6, 9),
        }
    }

    /// Expected code for a given time-step counter.
    fn code_at_counter(&self, key: &[u8], counter: u64) -> String {
        let mut mac = match HmacSha256::new_from_slice(key) {
            Ok(mac) => mac,
            // HMAC accepts any key length; unreachable in practice.
            Err(_) => return String::new(),
        };
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        // Dynamic truncation (RFC 4226 section 5.3).
        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let bin = (u32::from(digest[offset] & 0x7f) << 24)
            | (u32::from(digest[offset + 1]) << 16)
            | (u32::from(digest[offset + 2]) << 8)
            | u32::from(digest[offset + 3]);

        let code = bin % 10u32.pow(self.digits);
        format!("{:0width$}", code, width = self.digits as usize)
    }

    /// Verify `code` against `seed` at an explicit Unix timestamp.
    pub fn verify_at(&self, seed: &str, code: &str, unix_now: u64) -> bool {
        let key = match BASE64.decode(seed) {
            Ok(key) => key,
            Err(_) => return false,
        };

        let counter = unix_now / self.step_seconds;
        let mut valid = false;
        // Current window plus one adjacent window each way for drift.
        for candidate in counter.saturating_sub(1)..=counter + 1 {
            let expected = self.code_at_counter(&key, candidate);
            // Constant-time comparison: the outcome must not leak how
            // many characters matched.
            valid |= bool::from(expected.as_bytes().ct_eq(code.as_bytes()));
        }
        valid
    }

    /// Current code for a seed. Used by enrollment tests and tooling;
    /// a real client computes this on its own device.
    pub fn current_code(&self, seed: &str) -> Option<String> {
        let key = BASE64.decode(seed).ok()?;
        let counter = unix_now() / self.step_seconds;
        Some(self.code_at_counter(&key, counter))
    }
}

impl SecondFactorVerifier for TotpVerifier {
    fn verify(&self, seed: &str, code: &str) -> bool {
        self.verify_at(seed, code, unix_now())
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Generate a fresh enrollment seed: 20 random bytes, base64-encoded.
pub fn generate_seed() -> String {
    let mut bytes = [0u8; SEED_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Provisioning URI for authenticator apps.
pub fn provisioning_uri(issuer: &str, email: &str, seed: &str) -> String {
    format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}",
        issuer, email, seed, issuer
    )
}
