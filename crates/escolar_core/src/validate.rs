//! Input validators for personal and academic data.
//!
//! # Responsibility
//! - Validate CPF check digits, email shape and academic-year bounds.
//! - Normalize CPF values to their canonical 11-digit form.
//!
//! # Invariants
//! - Validators are pure: no storage access, no logging.
//! - `normalize_cpf` never fails; invalid input just yields fewer digits.

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;

const CPF_LEN: usize = 11;
const EMAIL_MIN_LEN: usize = 5;
const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;
const ACADEMIC_YEAR_MIN: i32 = 2000;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("valid email regex"));

/// Validates a Brazilian CPF, with or without punctuation.
///
/// Accepts formatted (`123.456.789-09`) and bare (`12345678909`) input.
/// Rejects anything that does not reduce to exactly 11 digits, sequences of
/// one repeated digit, and check-digit mismatches.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != CPF_LEN {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first = cpf_check_digit(&digits[..9], 10);
    let second = cpf_check_digit(&digits[..10], 11);
    digits[9] == first && digits[10] == second
}

/// Computes one CPF verifier digit.
///
/// Weights run from `start_weight` down to 2 over the given digits; the
/// result is reduced as `(sum * 10 % 11) % 10`.
fn cpf_check_digit(digits: &[u32], start_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (start_weight - i as u32))
        .sum();
    (sum * 10 % 11) % 10
}

/// Validates email shape: `local@domain.tld`, case-insensitive.
///
/// Bounds follow the usual mailbox limits: total length 5..=254, local part
/// up to 64 characters.
pub fn validate_email(email: &str) -> bool {
    let email = email.trim().to_lowercase();
    if email.len() < EMAIL_MIN_LEN || email.len() > EMAIL_MAX_LEN {
        return false;
    }
    if !EMAIL_RE.is_match(&email) {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) => local.len() <= EMAIL_LOCAL_MAX_LEN,
        None => false,
    }
}

/// Strips everything but digits from a CPF.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Formats an 11-digit CPF as `XXX.XXX.XXX-XX`.
///
/// Input that does not normalize to exactly 11 digits is returned unchanged.
pub fn format_cpf(cpf: &str) -> String {
    let digits = normalize_cpf(cpf);
    if digits.len() != CPF_LEN {
        return cpf.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..]
    )
}

/// Validates an academic year: 2000 up to two years past the current one.
pub fn validate_academic_year(year: i32) -> bool {
    year >= ACADEMIC_YEAR_MIN && year <= current_year() + 2
}

/// Current year on the local clock, used for academic-year defaults.
pub fn current_year() -> i32 {
    Local::now().year()
}
