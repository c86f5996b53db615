//! Attendance engine: sessions, self-check-in and instructor marking.
//!
//! Every operation takes `now` explicitly; nothing here reads a clock or
//! ambient request state.

pub mod code;
pub mod enrollment;
pub mod error;
pub mod marking;
pub mod notification;
pub mod session_manager;
pub mod settings;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use error::{AttendanceError, AttendanceResult};
