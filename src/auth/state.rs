// src/auth/state.rs
//! Pure transition function of the Verification Protocol
//!
//! No I/O happens here. The driver in `protocol` performs whatever the current state asks
//! for (prompt, gather evidence, wipe, reset) and feeds the outcome back as an [`Event`].

use crate::consts::{RESET_CONFIRMATION_PHRASE, WIPE_CONFIRMATION_PHRASE};
use crate::credential::CredentialCheck;
use crate::error::AuthError;

use super::evidence::{Evidence, ProfileCheck};

/// Terminal failure of a verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotInitialized,
    AuthMismatch { attempts: u32 },
    IntegrityTamper,
    PayloadCorrupt,
    Cancelled,
}

impl Failure {
    /// The failure a declined recovery leaves behind, named after the credential fault
    ///
    /// A sentinel that fails under a matching hash means the record was re-checksummed
    /// after an edit, which is tampering rather than a typo.
    fn from_fault(fault: CredentialCheck, attempts: u32) -> Self {
        match fault {
            CredentialCheck::Tampered | CredentialCheck::SentinelInvalid => Failure::IntegrityTamper,
            CredentialCheck::Missing => Failure::NotInitialized,
            _ => Failure::AuthMismatch { attempts },
        }
    }
}

impl From<Failure> for AuthError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::NotInitialized => AuthError::NotInitialized,
            Failure::AuthMismatch { attempts } => AuthError::AuthMismatch { attempts },
            Failure::IntegrityTamper => AuthError::IntegrityTamper,
            Failure::PayloadCorrupt => AuthError::PayloadCorrupt,
            Failure::Cancelled => AuthError::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Waiting for the first password
    Unverified,
    /// Waiting for another password after `attempts` failed ones
    Retry {
        attempts: u32,
        last: CredentialCheck,
    },
    Authenticated,
    /// Profile data vouches for the password but the credential record does not
    RepairCredential {
        fault: CredentialCheck,
        attempts: u32,
    },
    /// Record regenerated; waiting for the check made before it was committed
    RegeneratingCredential,
    /// Credential record vouches for the password but profile data does not decrypt
    ProfileCorrupted,
    ConfirmWipe,
    WipingProfiles,
    ProfilesWiped,
    /// Neither signal vouches for the password and the attempt budget is spent
    AmbiguousFailure {
        fault: CredentialCheck,
        attempts: u32,
    },
    ConfirmReset {
        fault: CredentialCheck,
        attempts: u32,
    },
    ResettingVault,
    VaultReset,
    Failed(Failure),
}

/// Input to the transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Evidence(Evidence),
    /// Answer to a y/N question
    Confirmed(bool),
    /// Literal text typed at a destructive-action prompt
    Phrase(String),
    /// The requested side effect (wipe, reset) finished
    Completed,
    Cancelled,
}

impl AuthState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AuthState::Authenticated
                | AuthState::ProfilesWiped
                | AuthState::VaultReset
                | AuthState::Failed(_)
        )
    }

    /// Advance on `event`. Events that mean nothing in the current state leave it unchanged.
    pub fn next(self, event: Event, max_attempts: u32) -> AuthState {
        use AuthState::*;

        if self.is_terminal() {
            return self;
        }
        if event == Event::Cancelled {
            return Failed(Failure::Cancelled);
        }

        let max_attempts = max_attempts.max(1);
        match (self, event) {
            (Unverified, Event::Evidence(evidence)) => attempt(evidence, 1, max_attempts),
            (Retry { attempts, .. }, Event::Evidence(evidence)) => {
                attempt(evidence, attempts + 1, max_attempts)
            }

            (RepairCredential { .. }, Event::Confirmed(true)) => RegeneratingCredential,
            (RepairCredential { fault, attempts }, Event::Confirmed(false)) => {
                Failed(Failure::from_fault(fault, attempts))
            }
            (RegeneratingCredential, Event::Evidence(evidence)) => {
                if evidence.authenticated() {
                    Authenticated
                } else {
                    Failed(Failure::IntegrityTamper)
                }
            }

            (ProfileCorrupted, Event::Confirmed(true)) => ConfirmWipe,
            (ProfileCorrupted, Event::Confirmed(false)) => Failed(Failure::PayloadCorrupt),
            (ConfirmWipe, Event::Phrase(phrase)) => {
                if phrase.trim() == WIPE_CONFIRMATION_PHRASE {
                    WipingProfiles
                } else {
                    Failed(Failure::PayloadCorrupt)
                }
            }
            (WipingProfiles, Event::Completed) => ProfilesWiped,

            (AmbiguousFailure { fault, attempts }, Event::Confirmed(true)) => {
                ConfirmReset { fault, attempts }
            }
            (AmbiguousFailure { fault, attempts }, Event::Confirmed(false)) => {
                Failed(Failure::from_fault(fault, attempts))
            }
            (ConfirmReset { fault, attempts }, Event::Phrase(phrase)) => {
                if phrase.trim() == RESET_CONFIRMATION_PHRASE {
                    ResettingVault
                } else {
                    Failed(Failure::from_fault(fault, attempts))
                }
            }
            (ResettingVault, Event::Completed) => VaultReset,

            (state, _) => state,
        }
    }
}

/// Decide the outcome of password attempt number `attempts`
fn attempt(evidence: Evidence, attempts: u32, max_attempts: u32) -> AuthState {
    let Evidence {
        credential,
        profiles,
    } = evidence;

    if credential.is_valid() {
        return if profiles.is_ok() {
            AuthState::Authenticated
        } else {
            AuthState::ProfileCorrupted
        };
    }

    match profiles {
        ProfileCheck::Decrypts => AuthState::RepairCredential {
            fault: credential,
            attempts,
        },
        // Nothing else can vouch for the password
        ProfileCheck::NoProfiles => match credential {
            CredentialCheck::Tampered | CredentialCheck::SentinelInvalid => {
                AuthState::Failed(Failure::IntegrityTamper)
            }
            CredentialCheck::Missing => AuthState::Failed(Failure::NotInitialized),
            _ if attempts < max_attempts => AuthState::Retry {
                attempts,
                last: credential,
            },
            _ => AuthState::Failed(Failure::AuthMismatch { attempts }),
        },
        ProfileCheck::Undecryptable if attempts < max_attempts => AuthState::Retry {
            attempts,
            last: credential,
        },
        ProfileCheck::Undecryptable => AuthState::AmbiguousFailure {
            fault: credential,
            attempts,
        },
    }
}
