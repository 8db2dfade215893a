use std::path::{Path, PathBuf};

use letterboxd_stats::config::*;

const FULL_CONFIG: &str = r#"
root_folder = "/tmp/letterboxd_stats_test"

[TMDB]
api_key = "abc123"
get_list_runtimes = true

[Letterboxd]
username = "cinephile"
password = "hunter2"

[CLI]
poster_columns = 60
ascending = true
"#;

fn source() -> &'static Path {
    Path::new("config.toml")
}

#[test]
fn test_full_config() {
    let config = Config::from_toml(FULL_CONFIG, source(), &EnvOverrides::default()).unwrap();

    assert_eq!(config.root_folder, PathBuf::from("/tmp/letterboxd_stats_test"));
    assert_eq!(config.tmdb.api_key, "abc123");
    assert!(config.tmdb.get_list_runtimes);
    assert_eq!(config.cli.poster_columns, 60);
    assert!(config.cli.ascending);
    assert_eq!(config.credentials().unwrap(), ("cinephile", "hunter2"));
    assert_eq!(
        config.exports_folder(),
        PathBuf::from("/tmp/letterboxd_stats_test/static")
    );
}

#[test]
fn test_missing_api_key_is_a_config_error() {
    let content = "[CLI]\nposter_columns = 40\n";
    let result = Config::from_toml(content, source(), &EnvOverrides::default());
    assert!(matches!(result, Err(ConfigError::MissingKey("TMDB.api_key"))));

    let empty_key = "[TMDB]\napi_key = \"  \"\n";
    let result = Config::from_toml(empty_key, source(), &EnvOverrides::default());
    assert!(matches!(result, Err(ConfigError::MissingKey(_))));
}

#[test]
fn test_defaults() {
    let config =
        Config::from_toml("[TMDB]\napi_key = \"k\"\n", source(), &EnvOverrides::default())
            .unwrap();

    assert_eq!(config.cli.poster_columns, DEFAULT_POSTER_COLUMNS);
    assert!(!config.cli.ascending);
    assert!(!config.tmdb.get_list_runtimes);
    assert_eq!(config.root_folder, default_root_folder());
}

#[test]
fn test_credentials_required_only_when_asked() {
    let config =
        Config::from_toml("[TMDB]\napi_key = \"k\"\n", source(), &EnvOverrides::default())
            .unwrap();

    assert!(matches!(
        config.credentials(),
        Err(ConfigError::MissingKey("Letterboxd.username"))
    ));
}

#[test]
fn test_env_overrides_win() {
    let overrides = EnvOverrides {
        tmdb_api_key: Some("from-env".to_string()),
        poster_columns: Some("0".to_string()),
        ascending: Some("no".to_string()),
        username: Some("other".to_string()),
        ..EnvOverrides::default()
    };
    let config = Config::from_toml(FULL_CONFIG, source(), &overrides).unwrap();

    assert_eq!(config.tmdb.api_key, "from-env");
    assert_eq!(config.cli.poster_columns, 0);
    assert!(!config.cli.ascending);
    assert_eq!(config.credentials().unwrap(), ("other", "hunter2"));
}

#[test]
fn test_env_override_supplies_missing_key() {
    let overrides = EnvOverrides {
        tmdb_api_key: Some("from-env".to_string()),
        ..EnvOverrides::default()
    };
    let config = Config::from_toml("", source(), &overrides).unwrap();
    assert_eq!(config.tmdb.api_key, "from-env");
}

#[test]
fn test_invalid_override() {
    let overrides = EnvOverrides {
        poster_columns: Some("wide".to_string()),
        ..EnvOverrides::default()
    };
    let result = Config::from_toml(FULL_CONFIG, source(), &overrides);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidOverride {
            var: "LBSTATS_CLI_POSTER_COLUMNS",
            ..
        })
    ));
}

#[test]
fn test_parse_error() {
    let result = Config::from_toml("[TMDB\napi_key = ", source(), &EnvOverrides::default());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_tilde_in_root_folder() {
    let content = "root_folder = \"~/letterboxd\"\n[TMDB]\napi_key = \"k\"\n";
    let config = Config::from_toml(content, source(), &EnvOverrides::default()).unwrap();

    if let Some(home) = dirs::home_dir() {
        assert_eq!(config.root_folder, home.join("letterboxd"));
    }
}

#[tokio::test]
async fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path()).await;

    match result {
        Err(ConfigError::NotFound(path)) => assert_eq!(path, dir.path().join(CONFIG_FILE)),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_from_folder() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), FULL_CONFIG).unwrap();

    // LBSTATS_* variables of the test environment would override the file
    if std::env::vars().any(|(k, _)| k.starts_with("LBSTATS_")) {
        return;
    }

    let config = Config::load(dir.path()).await.unwrap();
    assert_eq!(config.tmdb.api_key, "abc123");
}
