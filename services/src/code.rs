//! Session codes: short tokens an instructor reads out or projects.

use rand::Rng;

use crate::error::AttendanceError;

pub const CODE_LEN: usize = 6;

/// Upper bound on what we accept from a client before touching storage.
const MAX_INPUT_LEN: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Trims and upper-cases a client-supplied code, rejecting obvious garbage.
pub fn normalize_code(raw: &str) -> Result<String, AttendanceError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(AttendanceError::malformed("code is required"));
    }
    if code.len() > MAX_INPUT_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AttendanceError::malformed("code must be alphanumeric"));
    }
    Ok(code.to_ascii_uppercase())
}
