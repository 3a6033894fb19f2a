// src/bin/pvault.rs
//! pvault: command-line front end for profile-vault
//!
//! Every command that reads or changes profile data runs the full verification
//! protocol first. Only `status` trusts the session cache.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use profile_vault::auth::{read_new_password, Prompter, TerminalPrompter, Verifier};
use profile_vault::consts::RESET_CONFIRMATION_PHRASE;
use profile_vault::error::{AuthError, CoreError};
use profile_vault::{
    change_master_password, cleanup, export, profiles, Config, SessionCache, VarType,
    Verification, VerifiedPassword, Vault,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pvault", version, about = "API-key profiles encrypted under one master password")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set the master password for a new vault
    Init {
        /// Replace an existing master password, deleting every profile
        #[arg(long)]
        force: bool,
    },
    /// Check the master password and refresh the session
    Verify,
    /// Show vault state without asking for the password
    Status,
    /// Create an empty profile
    Add {
        profile: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Store an encrypted variable (value is read without echo)
    Set {
        profile: String,
        key: String,
        #[arg(long = "type", value_name = "TYPE", default_value = "other")]
        var_type: VarType,
    },
    /// Print decrypted values
    Get { profile: String, key: Option<String> },
    /// List profiles and their variable names
    List,
    /// Delete a profile and all of its variables
    Remove { profile: String },
    /// Print `export` lines for a shell, or write a JSON file
    Export {
        profile: String,
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },
    /// Change the master password
    Passwd,
}

fn main() -> ExitCode {
    init_tracing();
    if let Err(err) = cleanup::install_interrupt_handler() {
        warn!(error = %err, "could not install interrupt handler");
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let code = if let Some(auth) = err.downcast_ref::<AuthError>() {
        auth.exit_code()
    } else if let Some(core) = err.downcast_ref::<CoreError>() {
        core.exit_code()
    } else {
        1
    };
    u8::try_from(code).unwrap_or(1)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = profile_vault::load_config().context("failed to load configuration")?;
    let vault = Vault::open(&config).with_context(|| {
        format!("failed to open vault at {}", config.paths.database.display())
    })?;
    let sessions = SessionCache::from_config(&config);
    let mut prompter = TerminalPrompter::new();

    match cli.command {
        Command::Init { force } => init(&vault, &sessions, &mut prompter, force),
        Command::Status => status(&vault, &sessions),
        command => {
            let Some(verified) = verify(&vault, &sessions, &config, &mut prompter)? else {
                return Ok(ExitCode::FAILURE);
            };
            execute(command, &vault, &sessions, &mut prompter, verified)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// `None` when a recovery branch ran instead of authenticating
fn verify(
    vault: &Vault,
    sessions: &SessionCache,
    config: &Config,
    prompter: &mut TerminalPrompter,
) -> Result<Option<VerifiedPassword>, AuthError> {
    let outcome = Verifier::new(vault, sessions, prompter)
        .with_max_attempts(config.security.max_attempts)
        .run()?;
    Ok(match outcome {
        Verification::Authenticated(verified) => Some(verified),
        Verification::ProfilesWiped { .. } | Verification::VaultReset => None,
    })
}

fn init(
    vault: &Vault,
    sessions: &SessionCache,
    prompter: &mut TerminalPrompter,
    force: bool,
) -> Result<ExitCode> {
    let initialized = vault.is_initialized()?;
    let stored_values = profiles::count_env_vars(vault.conn())?;

    if !force {
        if initialized {
            return Err(CoreError::AlreadyInitialized.into());
        }
        if stored_values > 0 {
            eprintln!("Profile data exists without a credential record.");
            eprintln!("Run `pvault verify` to rebuild the record from your password, or `pvault init --force` to start over.");
            return Ok(ExitCode::FAILURE);
        }
    } else if initialized || profiles::count_profiles(vault.conn())? > 0 {
        eprintln!("This deletes every profile; values encrypted under the old password cannot be recovered.");
        let typed = prompter.phrase(&format!(
            "This cannot be undone. Type '{RESET_CONFIRMATION_PHRASE}' to continue"
        ))?;
        if typed.trim() != RESET_CONFIRMATION_PHRASE {
            eprintln!("Confirmation did not match; nothing was changed.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let password = read_new_password(prompter)?;
    if force {
        vault.reinitialize(&password)?;
    } else {
        vault.init_credential(&password)?;
    }
    if let Err(err) = sessions.create(&password) {
        warn!(error = %err, "could not write session");
    }
    eprintln!("Master password initialized.");
    Ok(ExitCode::SUCCESS)
}

fn status(vault: &Vault, sessions: &SessionCache) -> Result<ExitCode> {
    let conn = vault.conn();
    println!("database:    {}", conn.path().unwrap_or("(in memory)"));
    println!(
        "initialized: {}",
        if vault.is_initialized()? { "yes" } else { "no" }
    );
    println!("profiles:    {}", profiles::count_profiles(conn)?);
    println!("variables:   {}", profiles::count_env_vars(conn)?);
    match sessions.current() {
        Some(session) => {
            let remaining = session.remaining_at(SystemTime::now());
            println!("session:     active ({} min left)", remaining.as_secs().div_ceil(60));
        }
        None => println!("session:     none"),
    }
    Ok(ExitCode::SUCCESS)
}

fn execute(
    command: Command,
    vault: &Vault,
    sessions: &SessionCache,
    prompter: &mut TerminalPrompter,
    verified: VerifiedPassword,
) -> Result<()> {
    let conn = vault.conn();
    match command {
        Command::Verify => eprintln!("Master password verified."),

        Command::Add {
            profile,
            description,
        } => {
            let _lock = vault.lock()?;
            profiles::create_profile(conn, &profile, description.as_deref())?;
            eprintln!("Profile '{profile}' created.");
        }

        Command::Set {
            profile,
            key,
            var_type,
        } => {
            profiles::validate_env_key(&key)?;
            let value = prompter.secret(&format!("Value for {key}: "))?;
            let _lock = vault.lock()?;
            let profile = profiles::require_profile(conn, &profile)?;
            profiles::set_env_var(conn, &verified, &profile, &key, &value, var_type)?;
            eprintln!("Stored {key} in '{}'.", profile.name);
        }

        Command::Get { profile, key } => {
            let profile = profiles::require_profile(conn, &profile)?;
            match key {
                Some(key) => {
                    let Some(var) = profiles::env_var(conn, profile.id, &key)? else {
                        bail!("profile '{}' has no variable '{key}'", profile.name);
                    };
                    println!("{}", profiles::reveal(&var, &verified)?);
                }
                None => {
                    for var in profiles::env_vars(conn, profile.id)? {
                        println!("{}={}", var.key, profiles::reveal(&var, &verified)?);
                    }
                }
            }
        }

        Command::List => {
            for profile in profiles::list_profiles(conn)? {
                match &profile.description {
                    Some(description) => println!("{}  ({description})", profile.name),
                    None => println!("{}", profile.name),
                }
                for var in profiles::env_vars(conn, profile.id)? {
                    println!("  {} [{}]", var.key, var.var_type);
                }
            }
        }

        Command::Remove { profile } => {
            let _lock = vault.lock()?;
            if !profiles::delete_profile(conn, &profile)? {
                return Err(CoreError::ProfileNotFound(profile).into());
            }
            eprintln!("Profile '{profile}' removed.");
        }

        Command::Export { profile, json } => {
            let profile = profiles::require_profile(conn, &profile)?;
            match json {
                Some(path) => {
                    let count = export::export_profile_json(vault, &verified, &profile, &path)?;
                    eprintln!("Exported {count} variable(s) → {}", path.display());
                    eprintln!("SECURITY: this file holds plaintext secrets. Delete it after use.");
                }
                None => print!("{}", export::render_env(vault, &verified, &profile)?),
            }
        }

        Command::Passwd => {
            let new_password = read_new_password(prompter)?;
            let (summary, verified) = change_master_password(vault, verified, new_password)?;
            if let Err(err) = sessions.create(verified.password()) {
                warn!(error = %err, "could not refresh session");
            }
            eprintln!(
                "Master password changed; {} value(s) re-encrypted.",
                summary.re_encrypted
            );
        }

        Command::Init { .. } | Command::Status => {}
    }
    Ok(())
}
