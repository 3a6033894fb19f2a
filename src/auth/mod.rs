// src/auth/mod.rs
//! Verification Protocol
//!
//! `state` is the pure decision logic, `evidence` gathers what storage says about a
//! candidate password, `prompt` is the terminal adapter and `protocol` drives the loop.

pub mod evidence;
pub mod prompt;
pub mod protocol;
pub mod state;

pub use evidence::{Evidence, ProfileCheck};
pub use prompt::{read_new_password, validate_password, Notice, Prompter, TerminalPrompter};
pub use protocol::{Verification, VerifiedPassword, Verifier};
pub use state::{AuthState, Event, Failure};
