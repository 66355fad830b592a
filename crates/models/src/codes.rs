//! Human-facing reference codes stored next to the UUID keys.
use chrono::Utc;
use rand::Rng;

/// `B` + last 6 digits of the millisecond clock + 4 uppercase hex chars.
pub fn booking_code() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    let random: [u8; 2] = rand::random();
    format!("B{tail}{:02X}{:02X}", random[0], random[1])
}

pub fn user_code() -> String {
    prefixed("U")
}

pub fn vendor_code() -> String {
    prefixed("V")
}

fn prefixed(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    let n: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{prefix}{tail}{n:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_code_shape() {
        let code = booking_code();
        assert_eq!(code.len(), 11);
        assert!(code.starts_with('B'));
        assert!(code[1..7].chars().all(|c| c.is_ascii_digit()));
        assert!(code[7..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn account_codes_are_prefixed() {
        assert!(user_code().starts_with('U'));
        assert!(vendor_code().starts_with('V'));
        assert_eq!(user_code().len(), 12);
    }
}
