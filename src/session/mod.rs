//! Exam session state machine.
//!
//! Tracks per-slot responses, the question cursor and the countdown, and
//! exposes the navigation actions of the exam screen.

mod countdown;
mod state;

pub use countdown::Countdown;
pub use state::{ExamSession, SessionError};
