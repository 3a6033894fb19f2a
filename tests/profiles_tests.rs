// tests/profiles_tests.rs
mod common;
use common::{TestVault, PASSWORD};

use profile_vault::error::CoreError;
use profile_vault::profiles::{self, VarType};

#[test]
fn test_profile_crud() {
    let tv = TestVault::initialized(PASSWORD);
    let conn = tv.vault.conn();

    let work = profiles::create_profile(conn, "work", Some("team account")).unwrap();
    profiles::create_profile(conn, "alpha.dev-1", None).unwrap();

    assert!(matches!(
        profiles::create_profile(conn, "work", None),
        Err(CoreError::ProfileExists(_))
    ));

    let names: Vec<String> = profiles::list_profiles(conn)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["alpha.dev-1", "work"]);

    let found = profiles::find_profile(conn, "work").unwrap().unwrap();
    assert_eq!(found, work);
    assert_eq!(found.description.as_deref(), Some("team account"));

    assert!(profiles::delete_profile(conn, "work").unwrap());
    assert!(!profiles::delete_profile(conn, "work").unwrap());
    assert!(matches!(
        profiles::require_profile(conn, "work"),
        Err(CoreError::ProfileNotFound(_))
    ));
}

#[test]
fn test_name_validation() {
    for bad in ["", "has space", "semi;colon", "quote'"] {
        assert!(profiles::validate_profile_name(bad).is_err(), "{bad:?}");
    }
    for bad in ["", "1LEADING_DIGIT", "DASH-KEY", "A B"] {
        assert!(profiles::validate_env_key(bad).is_err(), "{bad:?}");
    }
    assert!(profiles::validate_env_key("_PRIVATE_2").is_ok());
}

#[test]
fn test_set_env_var_encrypts_and_upserts() {
    let tv = TestVault::initialized(PASSWORD);
    let verified = tv.authenticate(PASSWORD);
    let conn = tv.vault.conn();
    let profile = profiles::create_profile(conn, "p", None).unwrap();

    profiles::set_env_var(conn, &verified, &profile, "BASE_URL", "https://a", VarType::BaseUrl)
        .unwrap();
    profiles::set_env_var(conn, &verified, &profile, "BASE_URL", "https://b", VarType::Other)
        .unwrap();

    let vars = profiles::env_vars(conn, profile.id).unwrap();
    assert_eq!(vars.len(), 1);
    assert_eq!(vars[0].var_type, VarType::Other);
    assert!(vars[0].ciphertext.starts_with("U2FsdGVkX1"));
    assert_eq!(profiles::reveal(&vars[0], &verified).unwrap(), "https://b");

    let updated = profiles::require_profile(conn, "p").unwrap();
    assert!(updated.updated_at >= profile.updated_at);

    assert!(matches!(
        profiles::set_env_var(conn, &verified, &profile, "EMPTY", "", VarType::Other),
        Err(CoreError::EmptyValue(_))
    ));
    assert!(matches!(
        profiles::set_env_var(conn, &verified, &profile, "bad-key", "v", VarType::Other),
        Err(CoreError::InvalidName(_))
    ));
}

#[test]
fn test_delete_cascades_to_variables() {
    let tv = TestVault::initialized(PASSWORD);
    let verified = tv.authenticate(PASSWORD);
    tv.add_profile(&verified, "one", "KEY_A", "a");
    tv.add_profile(&verified, "two", "KEY_B", "b");
    let conn = tv.vault.conn();

    assert_eq!(profiles::count_env_vars(conn).unwrap(), 2);
    profiles::delete_profile(conn, "one").unwrap();
    assert_eq!(profiles::count_env_vars(conn).unwrap(), 1);
    assert_eq!(profiles::all_env_vars(conn).unwrap()[0].key, "KEY_B");
}

#[test]
fn test_sample_and_counts() {
    let tv = TestVault::initialized(PASSWORD);
    let conn = tv.vault.conn();
    assert!(profiles::sample_env_var(conn).unwrap().is_none());
    assert_eq!(profiles::count_profiles(conn).unwrap(), 0);

    let verified = tv.authenticate(PASSWORD);
    tv.add_profile(&verified, "only", "TOKEN", "t");
    let sample = profiles::sample_env_var(conn).unwrap().unwrap();
    assert_eq!(sample.key, "TOKEN");
    assert_eq!(sample.var_type, VarType::ApiKey);
}

#[test]
fn test_var_type_text_forms() {
    for (var_type, text) in [
        (VarType::ApiKey, "api_key"),
        (VarType::BaseUrl, "base_url"),
        (VarType::Other, "other"),
    ] {
        assert_eq!(var_type.to_string(), text);
        assert_eq!(text.parse::<VarType>().unwrap(), var_type);
        assert_eq!(serde_json::to_string(&var_type).unwrap(), format!("\"{text}\""));
    }
    assert!("password".parse::<VarType>().is_err());
}

#[test]
fn test_schema_rejects_unknown_var_type() {
    let tv = TestVault::initialized(PASSWORD);
    let conn = tv.vault.conn();
    let profile = profiles::create_profile(conn, "p", None).unwrap();
    let err = conn.execute(
        "INSERT INTO profile_env_vars (profile_id, key, value, var_type) VALUES (?1, 'K', 'v', 'secret')",
        [profile.id],
    );
    assert!(err.is_err());
}
