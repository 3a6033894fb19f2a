// src/auth/prompt.rs
//! Thin interactive adapter: asks a question, hands the answer back to the protocol

use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

use zeroize::Zeroizing;

use crate::aliases::MasterPassword;
use crate::consts::MAX_PASSWORD_LEN;
use crate::credential::CredentialCheck;
use crate::error::{AuthError, InputError};

/// Source of answers for the Verification Protocol
///
/// `Err(AuthError::Cancelled)` from any method aborts the run as a user cancellation.
pub trait Prompter {
    fn password(&mut self, prompt: &str) -> Result<MasterPassword, AuthError>;

    /// y/N question; anything but an explicit yes is a no
    fn confirm(&mut self, question: &str) -> Result<bool, AuthError>;

    /// Free text, used for typed confirmation phrases
    fn phrase(&mut self, instruction: &str) -> Result<String, AuthError>;

    fn notify(&mut self, notice: &Notice);
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn password(&mut self, prompt: &str) -> Result<MasterPassword, AuthError> {
        (**self).password(prompt)
    }

    fn confirm(&mut self, question: &str) -> Result<bool, AuthError> {
        (**self).confirm(question)
    }

    fn phrase(&mut self, instruction: &str) -> Result<String, AuthError> {
        (**self).phrase(instruction)
    }

    fn notify(&mut self, notice: &Notice) {
        (**self).notify(notice)
    }
}

/// Something the user should be told between prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AttemptFailed {
        fault: CredentialCheck,
        remaining: u32,
    },
    CredentialDamaged {
        fault: CredentialCheck,
    },
    CredentialRepaired,
    PayloadCorrupt,
    Ambiguous {
        attempts: u32,
    },
    ProfilesWiped {
        removed: usize,
    },
    VaultReset,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AttemptFailed {
                fault: CredentialCheck::Tampered,
                remaining,
            } => write!(
                f,
                "Credential record failed its integrity check and the password did not open profile data ({remaining} attempt(s) left)"
            ),
            Notice::AttemptFailed { remaining, .. } => {
                write!(f, "Incorrect master password ({remaining} attempt(s) left)")
            }
            Notice::CredentialDamaged { fault } => {
                let what = match fault {
                    CredentialCheck::Missing => "is missing",
                    CredentialCheck::Tampered => "failed its integrity check (storage was modified)",
                    _ => "does not accept this password",
                };
                write!(
                    f,
                    "The credential record {what}, but your profile data decrypts with this password"
                )
            }
            Notice::CredentialRepaired => f.write_str("Credential record regenerated"),
            Notice::PayloadCorrupt => f.write_str(
                "The master password is correct, but stored profile data cannot be decrypted",
            ),
            Notice::Ambiguous { attempts } => write!(
                f,
                "Neither the credential record nor the profile data accepted the password after {attempts} attempt(s). \
                 It may be mistyped, forgotten, or the data may be lost"
            ),
            Notice::ProfilesWiped { removed } => write!(
                f,
                "Removed {removed} profile(s). Re-add them or restore from a backup"
            ),
            Notice::VaultReset => f.write_str(
                "Vault reset. Run `pvault init` to set a new master password",
            ),
        }
    }
}

/// Reject empty and oversized passwords before they reach the cipher
pub fn validate_password(password: &str) -> Result<(), InputError> {
    if password.is_empty() {
        return Err(InputError::EmptyPassword);
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(InputError::PasswordTooLong {
            max: MAX_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Ask for a new password twice; both entries must match
pub fn read_new_password<P: Prompter + ?Sized>(
    prompter: &mut P,
) -> Result<MasterPassword, AuthError> {
    let first = prompter.password("New master password: ")?;
    validate_password(first.expose_secret())?;
    let second = prompter.password("Repeat new master password: ")?;
    if first.expose_secret() != second.expose_secret() {
        return Err(InputError::ConfirmationMismatch.into());
    }
    Ok(first)
}

/// Prompts on the controlling terminal; hidden input for secrets
#[derive(Debug, Default)]
pub struct TerminalPrompter {
    _private: (),
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hidden entry of a non-password secret (e.g. an API key)
    pub fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>, AuthError> {
        ensure_interactive()?;
        let value = Zeroizing::new(rpassword::prompt_password(prompt)?);
        if value.is_empty() {
            return Err(AuthError::Cancelled);
        }
        Ok(value)
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, AuthError> {
        ensure_interactive()?;
        let mut stderr = io::stderr().lock();
        write!(stderr, "{prompt}")?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(AuthError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }
}

impl Prompter for TerminalPrompter {
    fn password(&mut self, prompt: &str) -> Result<MasterPassword, AuthError> {
        ensure_interactive()?;
        let mut raw = Zeroizing::new(rpassword::prompt_password(prompt)?);
        validate_password(&raw)?;
        Ok(MasterPassword::new(std::mem::take(&mut *raw)))
    }

    fn confirm(&mut self, question: &str) -> Result<bool, AuthError> {
        let answer = self.read_line(&format!("{question} [y/N] "))?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn phrase(&mut self, instruction: &str) -> Result<String, AuthError> {
        self.read_line(&format!("{instruction}: "))
    }

    fn notify(&mut self, notice: &Notice) {
        eprintln!("{notice}");
    }
}

fn ensure_interactive() -> Result<(), AuthError> {
    if io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(InputError::NotInteractive.into())
    }
}
