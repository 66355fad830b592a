//! One-time codes. Development deployments use fixed codes so flows can be driven without SMS.
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::warn;
use crate::cache::Cache;

pub const STATIC_SIGNUP_OTP: &str = "123456";
pub const STATIC_BOOKING_OTP: &str = "1234";
/// Wrong guesses allowed before an issued code is discarded.
pub const MAX_VERIFY_ATTEMPTS: u64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct OtpGenerator {
    pub static_codes: bool,
}

impl OtpGenerator {
    pub fn new(static_codes: bool) -> Self { Self { static_codes } }

    /// 6-digit code for signup, login and PIN reset.
    pub fn account_code(&self) -> String {
        if self.static_codes { STATIC_SIGNUP_OTP.to_string() } else { random_digits(6) }
    }

    /// 4-digit code the vendor asks for when starting a job; drawn once per booking.
    pub fn booking_code(&self) -> String {
        if self.static_codes { STATIC_BOOKING_OTP.to_string() } else { random_digits(4) }
    }
}

fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

/// Why a code was issued; codes for one purpose never satisfy another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Verify,
    Reset,
}

impl OtpPurpose {
    fn as_str(self) -> &'static str {
        match self {
            OtpPurpose::Verify => "verify",
            OtpPurpose::Reset => "reset",
        }
    }
}

/// Cache-backed OTP issue/verify keyed by purpose, account kind and phone.
#[derive(Clone)]
pub struct OtpStore {
    cache: Arc<Cache>,
    generator: OtpGenerator,
    ttl: Duration,
}

impl OtpStore {
    pub fn new(cache: Arc<Cache>, generator: OtpGenerator, ttl: Duration) -> Self {
        Self { cache, generator, ttl }
    }

    fn key(purpose: OtpPurpose, kind: &str, phone: &str) -> String {
        format!("otp:{}:{}:{}", purpose.as_str(), kind, phone)
    }

    fn attempts_key(key: &str) -> String {
        format!("{key}:attempts")
    }

    pub fn issue(&self, purpose: OtpPurpose, kind: &str, phone: &str) -> String {
        let code = self.generator.account_code();
        let key = Self::key(purpose, kind, phone);
        self.cache.del(&Self::attempts_key(&key));
        self.cache.set(key, serde_json::Value::String(code.clone()), Some(self.ttl));
        code
    }

    /// Checks the code and consumes it on success. After [`MAX_VERIFY_ATTEMPTS`]
    /// wrong guesses the code is discarded and a new one must be requested.
    pub fn verify(&self, purpose: OtpPurpose, kind: &str, phone: &str, code: &str) -> bool {
        let key = Self::key(purpose, kind, phone);
        let attempts_key = Self::attempts_key(&key);
        match self.cache.get(&key) {
            Some(serde_json::Value::String(stored)) if stored == code => {
                self.cache.del(&key);
                self.cache.del(&attempts_key);
                true
            }
            Some(_) => {
                let failed = self.cache.get(&attempts_key).and_then(|v| v.as_u64()).unwrap_or(0) + 1;
                if failed >= MAX_VERIFY_ATTEMPTS {
                    warn!(event = "otp_discarded", purpose = purpose.as_str(), kind, "too many wrong codes");
                    self.cache.del(&key);
                    self.cache.del(&attempts_key);
                } else {
                    self.cache.set(attempts_key, serde_json::Value::from(failed), Some(self.ttl));
                }
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_codes_are_fixed() {
        let g = OtpGenerator::new(true);
        assert_eq!(g.account_code(), "123456");
        assert_eq!(g.booking_code(), "1234");
    }

    #[test]
    fn random_codes_have_expected_length() {
        let g = OtpGenerator::new(false);
        let code = g.account_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        let start = g.booking_code();
        assert_eq!(start.len(), 4);
        assert!(start.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn store_verifies_once_and_per_purpose() {
        let store = OtpStore::new(Arc::new(Cache::new()), OtpGenerator::new(true), Duration::from_secs(60));
        let code = store.issue(OtpPurpose::Verify, "user", "+911234567");
        assert!(!store.verify(OtpPurpose::Reset, "user", "+911234567", &code));
        assert!(!store.verify(OtpPurpose::Verify, "vendor", "+911234567", &code));
        assert!(store.verify(OtpPurpose::Verify, "user", "+911234567", &code));
        assert!(!store.verify(OtpPurpose::Verify, "user", "+911234567", &code));
    }

    #[test]
    fn code_is_discarded_after_repeated_wrong_guesses() {
        let store = OtpStore::new(Arc::new(Cache::new()), OtpGenerator::new(true), Duration::from_secs(60));
        let code = store.issue(OtpPurpose::Reset, "user", "+911234567");
        for _ in 0..MAX_VERIFY_ATTEMPTS {
            assert!(!store.verify(OtpPurpose::Reset, "user", "+911234567", "000000"));
        }
        assert!(!store.verify(OtpPurpose::Reset, "user", "+911234567", &code));

        let code = store.issue(OtpPurpose::Reset, "user", "+911234567");
        assert!(!store.verify(OtpPurpose::Reset, "user", "+911234567", "000000"));
        assert!(store.verify(OtpPurpose::Reset, "user", "+911234567", &code));
    }
}
