use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

/// Main application configuration with strongly-typed global sections
/// and a flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Core server configuration.
    pub server: ServerConfig,
    /// Document store persistence (optional; in-memory only when absent).
    pub store: Option<StoreConfig>,
    /// Token signing settings.
    pub auth: Option<AuthConfig>,
    /// Address geocoding provider.
    pub geocoder: Option<GeocoderConfig>,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Directory containing per-module YAML files (optional).
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // will be normalized to absolute path
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub timeout_sec: u64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// JSON snapshot loaded at startup and written on shutdown.
    /// Relative paths are resolved against `server.home_dir`.
    #[serde(default)]
    pub snapshot_file: Option<String>,
    /// Directory with `bootcamps.json`, `courses.json`, ... for `seed import`.
    #[serde(default)]
    pub seed_dir: Option<String>,
    #[serde(default = "default_true")]
    pub save_on_shutdown: bool,
}

fn default_jwt_expire_days() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HS256 signing secret. Must be set before serving.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expire_days")]
    pub jwt_expire_days: u32,
}

fn default_geocoder_url() -> String {
    "https://www.mapquestapi.com/geocoding/v1/address".to_string()
}

fn default_geocoder_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_geocoder_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            api_key: String::new(),
            timeout_ms: default_geocoder_timeout_ms(),
        }
    }
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    pub file: String,          // "logs/api.log"
    #[serde(default)]
    pub file_level: String,
    pub max_age_days: Option<u32>, // rotated files older than this are removed
    #[serde(default)]
    pub max_backups: Option<usize>, // How many files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => use platform default resolved by resolve_home_dir():
            // Windows: %APPDATA%/.devcamper
            // Unix/macOS: $HOME/.devcamper
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            timeout_sec: 0,
        }
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/devcamper.log".to_string(),
            file_level: "debug".to_string(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: Some(StoreConfig {
                snapshot_file: Some("data/store.json".to_string()),
                seed_dir: None,
                save_on_shutdown: true,
            }),
            auth: Some(AuthConfig {
                jwt_secret: String::new(),
                jwt_expire_days: default_jwt_expire_days(),
            }),
            geocoder: Some(GeocoderConfig::default()),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `server.home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            anyhow::bail!("config file not found: {}", config_path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let base = AppConfig {
            server: ServerConfig::default(),
            store: None,
            auth: None,
            geocoder: None,
            logging: None,
            modules_dir: None,
            modules: HashMap::new(),
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // Example: APP__AUTH__JWT_SECRET=... maps to auth.jwt_secret
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, dir)?;
        }

        Ok(config)
    }

    /// Load configuration from file or create with default values.
    /// Also normalizes `server.home_dir` into an absolute path and creates the directory.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)
                    .context("Failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }

    /// Resolve a configured path: absolute paths are kept, relative ones are
    /// joined with `server.home_dir`.
    pub fn resolve_path(&self, p: &str) -> PathBuf {
        let path = Path::new(p);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.server.home_dir).join(path)
        }
    }

    /// Typed view of `modules.<name>`; `None` when the module has no entry.
    pub fn module_config<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.modules
            .get(name)
            .map(|raw| {
                serde_json::from_value(raw.clone())
                    .with_context(|| format!("invalid config for module '{name}'"))
            })
            .transpose()
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Created under the user's home when `server.home_dir` is empty.
const DEFAULT_HOME_SUBDIR: &str = ".devcamper";

/// Replace `server.home_dir` with its absolute, existing form.
fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let configured = Some(server.home_dir.trim())
        .filter(|dir| !dir.is_empty())
        .map(str::to_owned);
    let home = resolve_home_dir(configured, DEFAULT_HOME_SUBDIR, true)
        .context("home_dir normalization failed")?;
    server.home_dir = home.to_string_lossy().into_owned();
    Ok(())
}

/// Each `<name>.yaml` (or `.yml`) in `dir` becomes `modules.<name>`,
/// replacing any inline entry. A missing directory is not an error.
fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot list modules_dir {}", dir.display()))?;
    for path in entries.filter_map(|e| e.ok().map(|e| e.path())) {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
            Some("yaml" | "yml")
        );
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_yaml || !path.is_file() {
            continue;
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let value: serde_json::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid module config {}", path.display()))?;
        bag.insert(name.to_owned(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Writes `body` under a `server:` block rooted in `tmp` and loads it.
    fn load(tmp: &TempDir, body: &str) -> Result<AppConfig> {
        let home = tmp.path().join("home").to_string_lossy().replace('\\', "/");
        let path = tmp.path().join("devcamper.yaml");
        fs::write(
            &path,
            format!("server:\n  home_dir: \"{home}\"\n  host: \"127.0.0.1\"\n  port: 5000\n{body}"),
        )?;
        AppConfig::load_layered(&path)
    }

    #[test]
    fn defaults_describe_a_local_server() {
        let config = AppConfig::default();

        assert_eq!((config.server.host.as_str(), config.server.port), ("127.0.0.1", 5000));
        assert!(config.server.home_dir.is_empty());

        let store = config.store.unwrap();
        assert_eq!(store.snapshot_file.as_deref(), Some("data/store.json"));
        assert!(store.save_on_shutdown);
        assert!(store.seed_dir.is_none());

        let auth = config.auth.unwrap();
        assert!(auth.jwt_secret.is_empty());
        assert_eq!(auth.jwt_expire_days, 30);

        assert!(config.geocoder.unwrap().base_url.contains("mapquestapi.com"));
        assert_eq!(config.logging.unwrap()["default"].file, "logs/devcamper.log");
    }

    #[test]
    fn yaml_sections_override_defaults() {
        let tmp = tempdir().unwrap();
        let config = load(
            &tmp,
            r#"
store:
  snapshot_file: "db/store.json"
  seed_dir: "/srv/seed"
  save_on_shutdown: false
auth:
  jwt_secret: "s3cret"
geocoder:
  api_key: "abc"
logging:
  default:
    console_level: debug
    file: "logs/default.log"
"#,
        )
        .unwrap();

        let home = Path::new(&config.server.home_dir);
        assert!(home.is_absolute() && home.is_dir());

        let store = config.store.as_ref().unwrap();
        assert_eq!(store.seed_dir.as_deref(), Some("/srv/seed"));
        assert!(!store.save_on_shutdown);
        let snapshot = config.resolve_path(store.snapshot_file.as_deref().unwrap());
        assert_eq!(snapshot, home.join("db/store.json"));
        assert_eq!(config.resolve_path("/tmp/x.json"), PathBuf::from("/tmp/x.json"));

        let auth = config.auth.as_ref().unwrap();
        assert_eq!((auth.jwt_secret.as_str(), auth.jwt_expire_days), ("s3cret", 30));

        let geo = config.geocoder.as_ref().unwrap();
        assert_eq!((geo.api_key.as_str(), geo.timeout_ms), ("abc", 5000));

        assert_eq!(config.logging.as_ref().unwrap()["default"].console_level, "debug");
    }

    #[test]
    fn absent_sections_stay_empty() {
        let tmp = tempdir().unwrap();
        let config = load(&tmp, "").unwrap();

        assert!(config.server.home_dir.ends_with("home"));
        assert!(config.store.is_none());
        assert!(config.auth.is_none());
        assert!(config.geocoder.is_none());
        assert!(config.logging.is_none());
        assert!(config.modules.is_empty());
    }

    #[test]
    fn unknown_sections_and_fields_are_rejected() {
        let tmp = tempdir().unwrap();
        assert!(load(&tmp, "database:\n  url: \"sqlite://x.db\"\n").is_err());
        assert!(load(&tmp, "auth:\n  secret: \"typo\"\n").is_err());
    }

    #[test]
    fn missing_host_is_rejected() {
        let yaml = "server:\n  home_dir: \"~/.test\"\n  port: 5000\n";
        assert!(serde_yaml::from_str::<AppConfig>(yaml).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn cli_port_and_verbosity() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (5, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                port: Some(3000),
                verbose,
                ..Default::default()
            });
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.logging.unwrap()["default"].console_level, expected);
        }
    }

    #[test]
    fn verbosity_creates_logging_when_absent() {
        let mut config = AppConfig {
            logging: None,
            ..AppConfig::default()
        };
        config.apply_cli_overrides(&CliArgs {
            verbose: 1,
            ..Default::default()
        });
        assert_eq!(config.logging.unwrap()["default"].console_level, "debug");
    }

    #[test]
    fn module_files_join_the_module_bag() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("modules");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("devcamper.yaml"), "default_page_size: 10\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let dir = dir.to_string_lossy().replace('\\', "/");
        let config = load(
            &tmp,
            &format!("modules_dir: \"{dir}\"\nmodules:\n  api_ingress:\n    bind_addr: \"127.0.0.1:5000\"\n"),
        )
        .unwrap();

        assert_eq!(config.modules.len(), 2);

        #[derive(serde::Deserialize)]
        struct Listing {
            default_page_size: u64,
        }
        let listing: Listing = config.module_config("devcamper").unwrap().unwrap();
        assert_eq!(listing.default_page_size, 10);
        assert!(config.module_config::<Listing>("absent").unwrap().is_none());
        assert!(config.module_config::<Listing>("api_ingress").is_err());
    }

    #[test]
    fn yaml_output_reloads() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("store:") && yaml.contains("logging:"));

        let reloaded: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded.server.port, config.server.port);
        assert_eq!(reloaded.auth.unwrap().jwt_expire_days, 30);
    }
}
