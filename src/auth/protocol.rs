// src/auth/protocol.rs
//! Driver for the Verification Protocol
//!
//! Runs the state machine in `state` against a live vault, performing the I/O each state
//! asks for. Its only successful product is a [`VerifiedPassword`], which every payload
//! operation takes as proof that verification happened.

use std::fmt;

use tracing::{info, warn};

use crate::aliases::MasterPassword;
use crate::consts::{DEFAULT_MAX_ATTEMPTS, RESET_CONFIRMATION_PHRASE, WIPE_CONFIRMATION_PHRASE};
use crate::credential;
use crate::error::AuthError;
use crate::profiles;
use crate::session::{Session, SessionCache};
use crate::vault::Vault;

use super::evidence;
use super::prompt::{validate_password, Notice, Prompter};
use super::state::{AuthState, Event};

const PASSWORD_PROMPT: &str = "Master password: ";

/// A master password that passed verification, plus the session it refreshed
pub struct VerifiedPassword {
    password: MasterPassword,
    session: Option<Session>,
}

impl fmt::Debug for VerifiedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedPassword")
            .field("password", &"[REDACTED]")
            .field("session", &self.session)
            .finish()
    }
}

impl VerifiedPassword {
    pub(crate) fn new(password: MasterPassword, session: Option<Session>) -> Self {
        Self { password, session }
    }

    pub fn password(&self) -> &MasterPassword {
        &self.password
    }

    /// `None` when the session artifact could not be written
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

/// How a verification run ended, short of an error
#[derive(Debug)]
pub enum Verification {
    Authenticated(VerifiedPassword),
    /// Profile data was unreadable and the user chose to wipe it
    ProfilesWiped { removed: usize },
    /// Nothing vouched for the password and the user chose a full reset
    VaultReset,
}

impl Verification {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Verification::Authenticated(_))
    }

    pub fn into_verified(self) -> Option<VerifiedPassword> {
        match self {
            Verification::Authenticated(verified) => Some(verified),
            _ => None,
        }
    }
}

pub struct Verifier<'a, P> {
    vault: &'a Vault,
    sessions: &'a SessionCache,
    prompter: P,
    max_attempts: u32,
}

impl<'a, P: Prompter> Verifier<'a, P> {
    pub fn new(vault: &'a Vault, sessions: &'a SessionCache, prompter: P) -> Self {
        Self {
            vault,
            sessions,
            prompter,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn run(mut self) -> Result<Verification, AuthError> {
        let vault = self.vault;
        let conn = vault.conn();
        if !credential::exists(conn)? && profiles::count_env_vars(conn)? == 0 {
            return Err(AuthError::NotInitialized);
        }

        let Some(mut candidate) = self.ask_password()? else {
            return Err(AuthError::Cancelled);
        };
        let first = evidence::gather(conn, &candidate)?;
        let mut state = AuthState::Unverified.next(Event::Evidence(first), self.max_attempts);
        let mut removed = 0;

        loop {
            let event = match state {
                AuthState::Unverified | AuthState::Retry { .. } => {
                    if let AuthState::Retry { attempts, last } = state {
                        self.prompter.notify(&Notice::AttemptFailed {
                            fault: last,
                            remaining: self.max_attempts.saturating_sub(attempts),
                        });
                    }
                    match self.ask_password()? {
                        Some(password) => {
                            let evidence = evidence::gather(conn, &password)?;
                            candidate = password;
                            Event::Evidence(evidence)
                        }
                        None => Event::Cancelled,
                    }
                }

                AuthState::RepairCredential { fault, .. } => {
                    self.prompter.notify(&Notice::CredentialDamaged { fault });
                    self.confirm("Regenerate the credential record from this password?")?
                }
                AuthState::RegeneratingCredential => {
                    let evidence = vault.repair_credential(&candidate)?;
                    if evidence.authenticated() {
                        self.prompter.notify(&Notice::CredentialRepaired);
                    }
                    Event::Evidence(evidence)
                }

                AuthState::ProfileCorrupted => {
                    self.prompter.notify(&Notice::PayloadCorrupt);
                    self.confirm("Wipe ALL profiles? The master password stays valid")?
                }
                AuthState::ConfirmWipe => self.phrase(WIPE_CONFIRMATION_PHRASE)?,
                AuthState::WipingProfiles => {
                    removed = vault.wipe_profiles()?;
                    Event::Completed
                }

                AuthState::AmbiguousFailure { attempts, .. } => {
                    self.prompter.notify(&Notice::Ambiguous { attempts });
                    self.confirm("Reset the vault, deleting the credential record and ALL profiles?")?
                }
                AuthState::ConfirmReset { .. } => self.phrase(RESET_CONFIRMATION_PHRASE)?,
                AuthState::ResettingVault => {
                    vault.reset()?;
                    if let Err(err) = self.sessions.discard() {
                        warn!(error = %err, "could not remove session file after reset");
                    }
                    Event::Completed
                }

                AuthState::Authenticated => {
                    let session = match self.sessions.create(&candidate) {
                        Ok(session) => Some(session),
                        Err(err) => {
                            warn!(error = %err, "could not write session; continuing without one");
                            None
                        }
                    };
                    info!("master password verified");
                    return Ok(Verification::Authenticated(VerifiedPassword::new(
                        candidate, session,
                    )));
                }
                AuthState::ProfilesWiped => {
                    self.prompter.notify(&Notice::ProfilesWiped { removed });
                    return Ok(Verification::ProfilesWiped { removed });
                }
                AuthState::VaultReset => {
                    self.prompter.notify(&Notice::VaultReset);
                    return Ok(Verification::VaultReset);
                }
                AuthState::Failed(failure) => return Err(failure.into()),
            };
            state = state.next(event, self.max_attempts);
        }
    }

    /// `Ok(None)` when the user cancelled
    fn ask_password(&mut self) -> Result<Option<MasterPassword>, AuthError> {
        match self.prompter.password(PASSWORD_PROMPT) {
            Ok(password) => {
                validate_password(password.expose_secret())?;
                Ok(Some(password))
            }
            Err(AuthError::Cancelled) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<Event, AuthError> {
        match self.prompter.confirm(question) {
            Ok(answer) => Ok(Event::Confirmed(answer)),
            Err(AuthError::Cancelled) => Ok(Event::Cancelled),
            Err(err) => Err(err),
        }
    }

    fn phrase(&mut self, expected: &str) -> Result<Event, AuthError> {
        match self
            .prompter
            .phrase(&format!("This cannot be undone. Type '{expected}' to continue"))
        {
            Ok(text) => Ok(Event::Phrase(text)),
            Err(AuthError::Cancelled) => Ok(Event::Cancelled),
            Err(err) => Err(err),
        }
    }
}
