//! Unit tests for endpoint parsing, resolution, and config loading.

use std::path::{Path, PathBuf};

use game_rpc::config::{ADDRESS_ENV, DEFAULT_TIMEOUT_MS, SOCKET_ENV};
use game_rpc::{AppError, ClientConfig, Endpoint, ErrorKind};

// ── host:port parsing ───────────────────────────────────────────────────────

#[test]
fn parses_host_and_port() {
    let endpoint = Endpoint::parse_tcp("game.local:7777").expect("valid");
    assert_eq!(endpoint, Endpoint::tcp("game.local", 7777));
    assert_eq!(endpoint.to_string(), "game.local:7777");
}

#[test]
fn parses_bracketed_ipv6() {
    let endpoint = Endpoint::parse_tcp("[::1]:7777").expect("valid");
    assert_eq!(endpoint, Endpoint::tcp("::1", 7777));
    assert_eq!(endpoint.to_string(), "[::1]:7777");
}

#[test]
fn rejects_unbracketed_ipv6() {
    let err = Endpoint::parse_tcp("::1:7777").expect_err("ambiguous");
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn rejects_missing_port() {
    assert!(Endpoint::parse_tcp("localhost").is_err());
    assert!(Endpoint::parse_tcp("localhost:").is_err());
}

#[test]
fn rejects_zero_and_out_of_range_ports() {
    assert!(Endpoint::parse_tcp("localhost:0").is_err());
    assert!(Endpoint::parse_tcp("localhost:70000").is_err());
}

#[test]
fn rejects_empty_host() {
    let err = Endpoint::parse_tcp(":7777").expect_err("empty host");
    assert!(err.to_string().starts_with("config:"), "{err}");
}

#[test]
fn unix_endpoint_displays_path() {
    let endpoint = Endpoint::unix("/run/game/rpc.sock");
    assert_eq!(endpoint.to_string(), "/run/game/rpc.sock");
}

#[test]
fn empty_socket_path_is_invalid() {
    assert!(Endpoint::unix("").validate().is_err());
}

// ── Client config ───────────────────────────────────────────────────────────

#[test]
fn default_timeout_is_5000_ms() {
    let config = ClientConfig::new(Endpoint::tcp("localhost", 7777));
    assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(DEFAULT_TIMEOUT_MS, 5000);
}

#[test]
fn zero_timeout_is_rejected() {
    let config = ClientConfig::new(Endpoint::tcp("localhost", 7777)).with_timeout_ms(0);
    assert!(matches!(config.validate(), Err(AppError::Config(_))));
}

#[test]
fn toml_with_address() {
    let config = ClientConfig::from_toml_str(
        r#"
address = "127.0.0.1:7777"
timeout_ms = 250
"#,
    )
    .expect("valid config");
    assert_eq!(config.endpoint, Endpoint::tcp("127.0.0.1", 7777));
    assert_eq!(config.timeout_ms, 250);
}

#[test]
fn toml_with_socket_path_uses_default_timeout() {
    let config = ClientConfig::from_toml_str(r#"socket_path = "/tmp/game.sock""#)
        .expect("valid config");
    assert_eq!(config.endpoint, Endpoint::unix("/tmp/game.sock"));
    assert_eq!(config.timeout_ms, 5000);
}

#[test]
fn toml_with_both_endpoints_is_rejected() {
    let err = ClientConfig::from_toml_str(
        r#"
address = "127.0.0.1:7777"
socket_path = "/tmp/game.sock"
"#,
    )
    .expect_err("ambiguous");
    assert!(err.to_string().contains("not both"), "{err}");
}

#[test]
fn toml_without_endpoint_is_rejected() {
    let err = ClientConfig::from_toml_str("timeout_ms = 100").expect_err("no endpoint");
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn toml_unknown_field_is_rejected() {
    let err = ClientConfig::from_toml_str(
        r#"
address = "127.0.0.1:7777"
retries = 3
"#,
    )
    .expect_err("unknown field");
    assert!(err.to_string().starts_with("config: invalid config"), "{err}");
}

#[test]
fn load_from_path_reads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("client.toml");
    std::fs::write(&path, "address = \"localhost:9000\"\ntimeout_ms = 900\n").expect("write");

    let config = ClientConfig::load_from_path(&path).expect("valid config");
    assert_eq!(config.endpoint, Endpoint::tcp("localhost", 9000));
    assert_eq!(config.timeout(), std::time::Duration::from_millis(900));
}

#[test]
fn load_from_missing_path_is_config_error() {
    let err = ClientConfig::load_from_path("/definitely/not/here.toml").expect_err("missing");
    assert_eq!(err.kind(), ErrorKind::Config);
}

// ── Environment resolution ──────────────────────────────────────────────────
//
// These tests mutate process-global env vars and must run serially.

fn clear_env() {
    std::env::remove_var(ADDRESS_ENV);
    std::env::remove_var(SOCKET_ENV);
}

#[test]
#[serial_test::serial]
fn from_env_reads_address() {
    clear_env();
    std::env::set_var(ADDRESS_ENV, "127.0.0.1:4000");

    let endpoint = Endpoint::from_env().expect("address set");
    assert_eq!(endpoint, Endpoint::tcp("127.0.0.1", 4000));

    clear_env();
}

#[test]
#[serial_test::serial]
fn from_env_reads_socket() {
    clear_env();
    std::env::set_var(SOCKET_ENV, "/tmp/env.sock");

    let config = ClientConfig::from_env().expect("socket set");
    assert_eq!(config.endpoint, Endpoint::unix("/tmp/env.sock"));
    assert_eq!(config.timeout_ms, 5000);

    clear_env();
}

#[test]
#[serial_test::serial]
fn from_env_without_variables_is_config_error() {
    clear_env();

    let err = Endpoint::from_env().expect_err("nothing set");
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains(ADDRESS_ENV), "{err}");
    assert!(err.to_string().contains(SOCKET_ENV), "{err}");
}

#[test]
#[serial_test::serial]
fn from_env_with_both_variables_is_ambiguous() {
    clear_env();
    std::env::set_var(ADDRESS_ENV, "127.0.0.1:4000");
    std::env::set_var(SOCKET_ENV, "/tmp/env.sock");

    let err = Endpoint::from_env().expect_err("ambiguous");
    assert!(err.to_string().contains("choose one"), "{err}");

    clear_env();
}

#[test]
#[serial_test::serial]
fn empty_variable_counts_as_unset() {
    clear_env();
    std::env::set_var(ADDRESS_ENV, "  ");

    assert!(Endpoint::resolve_tcp(None).is_err());

    clear_env();
}

#[test]
#[serial_test::serial]
fn explicit_address_wins_over_environment() {
    clear_env();
    std::env::set_var(ADDRESS_ENV, "127.0.0.1:4000");

    let endpoint = Endpoint::resolve_tcp(Some("10.0.0.2:5000")).expect("explicit");
    assert_eq!(endpoint, Endpoint::tcp("10.0.0.2", 5000));

    let fallback = Endpoint::resolve_tcp(None).expect("env fallback");
    assert_eq!(fallback, Endpoint::tcp("127.0.0.1", 4000));

    clear_env();
}

#[test]
#[serial_test::serial]
fn explicit_socket_wins_over_environment() {
    clear_env();
    std::env::set_var(SOCKET_ENV, "/tmp/env.sock");

    let endpoint = Endpoint::resolve_unix(Some(Path::new("/tmp/arg.sock"))).expect("explicit");
    assert_eq!(endpoint, Endpoint::unix("/tmp/arg.sock"));

    let fallback = Endpoint::resolve_unix(None).expect("env fallback");
    assert_eq!(fallback, Endpoint::Unix { path: PathBuf::from("/tmp/env.sock") });

    clear_env();
    assert!(Endpoint::resolve_unix(None).is_err());
}
