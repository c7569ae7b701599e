use super::*;

use std::{
    env,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("csv_validator_settings_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_when_nothing_is_configured() {
    let settings = load_settings_from(Path::new("/nonexistent/validator.toml"), no_env);
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.port, 8000);
    assert_eq!(settings.scheme, "http");
    assert_eq!(settings.host, None);
}

#[test]
fn reads_values_from_settings_file() {
    let path = temp_settings_file(
        "scheme = \"https\"\nhost = \"validator.internal\"\nport = 9443\nrequest_timeout_secs = 5\n",
    );

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.scheme, "https");
    assert_eq!(settings.host.as_deref(), Some("validator.internal"));
    assert_eq!(settings.port, 9443);
    assert_eq!(settings.request_timeout, Duration::from_secs(5));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn environment_overrides_file() {
    let path = temp_settings_file("host = \"from-file\"\nport = 9000\n");

    let settings = load_settings_from(
        &path,
        env_from(&[("VALIDATOR_HOST", "from-env"), ("APP__PORT", "7000")]),
    );
    assert_eq!(settings.host.as_deref(), Some("from-env"));
    assert_eq!(settings.port, 7000);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn app_prefixed_variable_wins_over_plain_one() {
    let settings = load_settings_from(
        Path::new("/nonexistent/validator.toml"),
        env_from(&[("VALIDATOR_HOST", "plain"), ("APP__HOST", "prefixed")]),
    );
    assert_eq!(settings.host.as_deref(), Some("prefixed"));
}

#[test]
fn ignores_unparseable_numbers_and_blank_values() {
    let settings = load_settings_from(
        Path::new("/nonexistent/validator.toml"),
        env_from(&[
            ("VALIDATOR_PORT", "eighty"),
            ("APP__REQUEST_TIMEOUT_SECS", "-1"),
            ("VALIDATOR_HOST", "   "),
        ]),
    );
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn malformed_settings_file_is_ignored() {
    let path = temp_settings_file("port = \"not a number\"");
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings, ClientSettings::default());
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn zero_request_timeout_is_ignored() {
    let path = temp_settings_file("request_timeout_secs = 0\n");
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    fs::remove_file(path).expect("cleanup");

    let settings = load_settings_from(
        Path::new("/nonexistent/validator.toml"),
        env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]),
    );
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}
