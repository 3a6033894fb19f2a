// tests/common/mod.rs
//! Shared test utilities: temporary vaults, scripted prompts, logging setup
#![allow(dead_code)]

use std::collections::VecDeque;

use profile_vault::auth::{Notice, Prompter, Verifier};
use profile_vault::profiles::{self, Profile, VarType};
use profile_vault::{
    AuthError, Config, MasterPassword, SessionCache, Vault, Verification, VerifiedPassword,
};
use tempfile::TempDir;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const PASSWORD: &str = "Sup3rSecret!";

/// Initialize test-friendly logging; idempotent
pub fn setup() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

pub fn password(text: &str) -> MasterPassword {
    MasterPassword::new(text.to_owned())
}

/// A vault with its database, lock and session file inside a fresh temp dir
pub struct TestVault {
    pub dir: TempDir,
    pub config: Config,
    pub vault: Vault,
    pub sessions: SessionCache,
}

impl TestVault {
    pub fn new() -> Self {
        setup();
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = Config::in_dir(dir.path());
        let vault = Vault::open(&config).expect("open vault");
        let sessions = SessionCache::from_config(&config);
        Self {
            dir,
            config,
            vault,
            sessions,
        }
    }

    pub fn initialized(master: &str) -> Self {
        let tv = Self::new();
        tv.vault
            .init_credential(&password(master))
            .expect("init credential");
        tv
    }

    pub fn verifier<'a>(
        &'a self,
        prompter: &'a mut ScriptedPrompter,
    ) -> Verifier<'a, &'a mut ScriptedPrompter> {
        Verifier::new(&self.vault, &self.sessions, prompter)
            .with_max_attempts(self.config.security.max_attempts)
    }

    pub fn verify(&self, prompter: &mut ScriptedPrompter) -> Result<Verification, AuthError> {
        self.verifier(prompter).run()
    }

    /// Run verification with `master` and insist on success
    pub fn authenticate(&self, master: &str) -> VerifiedPassword {
        let mut prompter = ScriptedPrompter::new().with_password(master);
        match self.verify(&mut prompter) {
            Ok(Verification::Authenticated(verified)) => verified,
            other => panic!("expected authentication, got {other:?}"),
        }
    }

    /// Create `name` holding one variable
    pub fn add_profile(
        &self,
        verified: &VerifiedPassword,
        name: &str,
        key: &str,
        value: &str,
    ) -> Profile {
        let conn = self.vault.conn();
        let profile = profiles::create_profile(conn, name, None).expect("create profile");
        profiles::set_env_var(conn, verified, &profile, key, value, VarType::ApiKey)
            .expect("set env var");
        profile
    }

    pub fn execute(&self, sql: &str) {
        self.vault.conn().execute_batch(sql).expect("execute sql");
    }

    pub fn credential_field(&self, column: &str) -> String {
        self.vault
            .conn()
            .query_row(&format!("SELECT {column} FROM auth WHERE id = 1"), [], |r| {
                r.get(0)
            })
            .expect("read credential field")
    }

    pub fn set_credential_field(&self, column: &str, value: &str) {
        self.vault
            .conn()
            .execute(&format!("UPDATE auth SET {column} = ?1 WHERE id = 1"), [value])
            .expect("update credential field");
    }
}

/// Flip the first character of `text` to a different one of the same kind
pub fn flip_first_char(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    chars[0] = match chars[0] {
        '0' => '1',
        'a' => 'b',
        'U' => 'V',
        c if c.is_ascii_digit() => '0',
        c if c.is_ascii_lowercase() => 'a',
        _ => 'U',
    };
    chars.into_iter().collect()
}

/// Answers queued ahead of time; an exhausted queue behaves like Ctrl-D
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    passwords: VecDeque<String>,
    confirms: VecDeque<bool>,
    phrases: VecDeque<String>,
    pub notices: Vec<Notice>,
    pub password_prompts: usize,
    pub confirm_prompts: usize,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.passwords.push_back(password.to_owned());
        self
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn with_phrase(mut self, phrase: &str) -> Self {
        self.phrases.push_back(phrase.to_owned());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn password(&mut self, _prompt: &str) -> Result<MasterPassword, AuthError> {
        self.password_prompts += 1;
        self.passwords
            .pop_front()
            .map(MasterPassword::new)
            .ok_or(AuthError::Cancelled)
    }

    fn confirm(&mut self, _question: &str) -> Result<bool, AuthError> {
        self.confirm_prompts += 1;
        self.confirms.pop_front().ok_or(AuthError::Cancelled)
    }

    fn phrase(&mut self, _instruction: &str) -> Result<String, AuthError> {
        self.phrases.pop_front().ok_or(AuthError::Cancelled)
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
