use calc_engine::SessionSettings;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Built-in defaults; every other source layers on top of these.
const DEFAULT_CONFIG: &str = include_str!("../global_config.yaml");

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_dev_env")]
    pub dev_env: String,
    pub session: SessionConfig,
    pub serve: ServeConfig,
    pub logging: LoggingConfig,
}

fn default_dev_env() -> String {
    "dev".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub history_visible: bool,
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            history_visible: self.history_visible,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServeConfig {
    pub socket: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LoggingFormatConfig,
    pub levels: LoggingLevelsConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingFormatConfig {
    pub show_time: bool,
    #[serde(default)]
    pub json: bool,
    pub location: LoggingLocationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLocationConfig {
    pub show_file: bool,
    pub show_line: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLevelsConfig {
    pub debug: bool,
    pub info: bool,
    pub warning: bool,
    pub error: bool,
    pub critical: bool,
}

impl LoggingConfig {
    /// The most verbose level enabled, as an `EnvFilter` directive.
    pub fn level(&self) -> &'static str {
        if self.verbose || self.levels.debug {
            "debug"
        } else if self.levels.info {
            "info"
        } else if self.levels.warning {
            "warn"
        } else if self.levels.error || self.levels.critical {
            "error"
        } else {
            "off"
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct RedactionConfig {
    #[serde(default = "true_default")]
    pub enabled: bool,
    #[serde(default)]
    pub patterns: Vec<RedactionPattern>,
}

fn true_default() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedactionPattern {
    pub name: String,
    pub regex: String,
    pub placeholder: String,
}

/// Load configuration from the built-in defaults, the override files in
/// the working directory, an optional explicit file, then `APP__*` env vars.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
        // Load production config if present
        .add_source(File::from(Path::new("production_config.yaml")).required(false))
        // Load local override
        .add_source(File::from(Path::new(".global_config.yaml")).required(false));

    if let Some(path) = explicit {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        // Map nested env vars like APP__LOGGING__VERBOSE=true
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    struct EnvGuard(&'static str);
    impl EnvGuard {
        fn new(key: &'static str, val: &str) -> Self {
            env::set_var(key, val);
            Self(key)
        }
    }
    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(self.0);
        }
    }

    #[test]
    #[serial]
    fn test_load_config() {
        let config = load_config(None);
        assert!(config.is_ok(), "Failed to load config: {:?}", config.err());

        let config = config.unwrap();
        assert_eq!(config.dev_env, "dev");
        assert!(!config.session.history_visible);
        assert_eq!(config.serve.socket, PathBuf::from("/tmp/calcctl.sock"));
        assert_eq!(config.logging.level(), "warn");
    }

    #[test]
    #[serial]
    fn test_env_var_override_precedence() {
        let _guard = EnvGuard::new("APP__SERVE__SOCKET", "/tmp/other.sock");

        let config = load_config(None).expect("Should load config");
        assert_eq!(config.serve.socket, PathBuf::from("/tmp/other.sock"));
    }

    #[test]
    #[serial]
    fn test_type_coercion_boolean() {
        {
            let _guard = EnvGuard::new("APP__SESSION__HISTORY_VISIBLE", "true");
            let config = load_config(None).expect("Should load config");
            assert!(config.session.history_visible);
            assert!(config.session.settings().history_visible);
        }

        {
            let _guard = EnvGuard::new("APP__SESSION__HISTORY_VISIBLE", "false");
            let config = load_config(None).expect("Should load config");
            assert!(!config.session.history_visible);
        }

        {
            let _guard = EnvGuard::new("APP__LOGGING__VERBOSE", "true");
            let config = load_config(None).expect("Should load config");
            assert_eq!(config.logging.level(), "debug");
        }
    }

    #[test]
    #[serial]
    fn test_dev_env_override() {
        let _guard = EnvGuard::new("APP__DEV_ENV", "production");
        let config = load_config(None).expect("Should load config");
        assert_eq!(config.dev_env, "production");
    }

    #[test]
    #[serial]
    fn test_explicit_file_must_exist() {
        let missing = env::temp_dir().join("calcctl_no_such_config.yaml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    #[serial]
    fn test_explicit_file_overrides_defaults() {
        let path = env::temp_dir().join(format!("calcctl_cfg_{}.yaml", std::process::id()));
        std::fs::write(&path, "session:\n  history_visible: true\n").unwrap();

        let config = load_config(Some(&path)).expect("Should load config");
        assert!(config.session.history_visible);
        assert_eq!(config.serve.socket, PathBuf::from("/tmp/calcctl.sock"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn test_level_selection() {
        let mut logging = load_config(None).unwrap().logging;
        logging.levels = LoggingLevelsConfig {
            debug: false,
            info: false,
            warning: false,
            error: false,
            critical: false,
        };
        assert_eq!(logging.level(), "off");
        logging.levels.critical = true;
        assert_eq!(logging.level(), "error");
        logging.levels.info = true;
        assert_eq!(logging.level(), "info");
    }
}
