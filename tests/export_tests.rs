// tests/export_tests.rs
mod common;
use common::{TestVault, PASSWORD};

use std::fs;

use profile_vault::export::{self, env::shell_quote};
use profile_vault::profiles::{self, VarType};
use serde_json::Value;

#[test]
fn test_shell_quoting() {
    assert_eq!(shell_quote("plain"), "'plain'");
    assert_eq!(shell_quote(""), "''");
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
    assert_eq!(shell_quote("$HOME `x` \"q\""), "'$HOME `x` \"q\"'");
}

#[test]
fn test_env_render() {
    let tv = TestVault::initialized(PASSWORD);
    let verified = tv.authenticate(PASSWORD);
    let conn = tv.vault.conn();
    let profile = profiles::create_profile(conn, "shell", None).unwrap();
    profiles::set_env_var(conn, &verified, &profile, "OPENAI_API_KEY", "sk-1", VarType::ApiKey)
        .unwrap();
    profiles::set_env_var(conn, &verified, &profile, "NOTE", "don't", VarType::Other).unwrap();

    let rendered = export::render_env(&tv.vault, &verified, &profile).unwrap();
    assert_eq!(
        rendered,
        "export NOTE='don'\\''t'\nexport OPENAI_API_KEY='sk-1'\n"
    );
}

#[test]
fn test_json_export_contains_plaintext_values() {
    let tv = TestVault::initialized(PASSWORD);
    let verified = tv.authenticate(PASSWORD);
    let profile = tv.add_profile(&verified, "openai", "OPENAI_API_KEY", "sk-test-1234567890abcdef");

    let path = tv.dir.path().join("out").join("openai.json");
    let count = export::export_profile_json(&tv.vault, &verified, &profile, &path).unwrap();
    assert_eq!(count, 1);

    let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["export_format"], "profile-vault-v1");
    assert_eq!(json["profile"]["name"], "openai");
    assert_eq!(json["total_variables"], 1);
    assert_eq!(json["variables"][0]["key"], "OPENAI_API_KEY");
    assert_eq!(json["variables"][0]["value"], "sk-test-1234567890abcdef");
    assert_eq!(json["variables"][0]["type"], "api_key");
    assert!(json["warning"].as_str().unwrap().contains("PLAINTEXT"));

    // only the final file remains
    let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
