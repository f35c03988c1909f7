//! No-mock configuration validation + resolution tests.
//!
//! Covers:
//! - Engine config validation against real JSON fixtures
//! - Resolution order (explicit > env path > env dir > defaults)

use credal_config::resolve::{load_config, resolve_config, ConfigSource, ENV_CONFIG_DIR, ENV_CONFIG_PATH};
use credal_config::validate::{validate_config, ValidationError};
use credal_config::EngineConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test")
        .join("fixtures")
        .join("config")
}

fn load_fixture(name: &str) -> EngineConfig {
    EngineConfig::from_file(&fixtures_dir().join(name)).expect("read engine fixture")
}

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let saved = keys.iter().map(|k| env::var(k).ok()).collect();
        for key in keys {
            env::remove_var(key);
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, saved) in self.keys.iter().zip(&self.saved) {
            match saved {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock poisoned");
    f()
}

#[test]
fn test_valid_fixture_passes() {
    let config = load_fixture("valid_engine.json");
    validate_config(&config).expect("valid config should pass validation");
    assert_eq!(config.threads.workers, 4);
    assert!(config.vertices.eliminate_redundant);
    assert!(config.dynamic.repetitive_independence);
    assert_eq!(config.approximation.period_size, 10);
}

#[test]
fn test_fixture_without_stopping_criterion_fails() {
    let config = load_fixture("invalid_engine_no_stop.json");
    let err = validate_config(&config).expect_err("no criterion should fail");
    assert!(matches!(err, ValidationError::SemanticError(_)));
}

#[test]
fn test_fixture_with_negative_epsilon_fails() {
    let config = load_fixture("invalid_engine_bad_epsilon.json");
    let err = validate_config(&config).expect_err("negative epsilon should fail");
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = EngineConfig::from_file(Path::new("/nonexistent/credal/engine.json"))
        .expect_err("missing file");
    assert!(matches!(err, ValidationError::IoError(_)));
    assert_eq!(err.code(), 60);
}

#[test]
fn test_env_path_resolution() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("from-env.json");
        fs::copy(fixtures_dir().join("valid_engine.json"), &path).expect("copy fixture");
        env::set_var(ENV_CONFIG_PATH, &path);

        let resolved = resolve_config(None);
        assert_eq!(resolved.source, ConfigSource::Environment);
        assert_eq!(resolved.path.as_deref(), Some(path.as_path()));
    });
}

#[test]
fn test_env_dir_resolution() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        fs::copy(
            fixtures_dir().join("valid_engine.json"),
            dir.path().join("engine.json"),
        )
        .expect("copy fixture");
        env::set_var(ENV_CONFIG_DIR, dir.path());

        let resolved = load_config(None).expect("load config");
        assert_eq!(resolved.source, ConfigSource::Environment);
        assert_eq!(resolved.config.threads.workers, 4);
    });
}

#[test]
fn test_explicit_path_beats_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let env_path = dir.path().join("env.json");
        let explicit = dir.path().join("explicit.json");
        fs::write(&env_path, "{}").expect("write env config");
        fs::write(&explicit, r#"{"threads": {"workers": 7}}"#).expect("write explicit config");
        env::set_var(ENV_CONFIG_PATH, &env_path);

        let resolved = load_config(Some(&explicit)).expect("load config");
        assert_eq!(resolved.source, ConfigSource::Explicit);
        assert_eq!(resolved.config.threads.workers, 7);
    });
}

#[test]
fn test_invalid_explicit_config_is_rejected() {
    let path = fixtures_dir().join("invalid_engine_bad_epsilon.json");
    let err = load_config(Some(&path)).expect_err("invalid config");
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}
