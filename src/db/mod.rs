// src/db/mod.rs
pub mod lock;
pub mod vault_db_conn;

pub use lock::VaultLock;
pub use vault_db_conn::{open_in_memory, open_vault_db};
