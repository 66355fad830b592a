//! Field rules shared by request DTOs and model constructors.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ModelError;

pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d{6,15}$").expect("phone regex"));
pub static PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("pin regex"));

pub const MAX_RESCHEDULES: i32 = 2;
pub const MAX_REVIEW_LEN: usize = 1000;

pub fn phone(value: &str) -> Result<(), ModelError> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(ModelError::Validation("Invalid phone number format.".into()))
    }
}

pub fn name(value: &str) -> Result<(), ModelError> {
    let len = value.trim().chars().count();
    if len < 2 {
        return Err(ModelError::Validation("Name must be at least 2 characters".into()));
    }
    if len > 50 {
        return Err(ModelError::Validation("Name must not exceed 50 characters".into()));
    }
    Ok(())
}

pub fn rating(value: i32) -> Result<(), ModelError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::Validation("Rating must be between 1 and 5".into()))
    }
}

pub fn review(value: &str) -> Result<(), ModelError> {
    if value.chars().count() > MAX_REVIEW_LEN {
        return Err(ModelError::Validation("Review must not exceed 1000 characters".into()));
    }
    Ok(())
}
