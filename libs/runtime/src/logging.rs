use crate::config::{LoggingConfig, Section};
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{level_filters::LevelFilter, Level, Metadata};
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt::{self, MakeWriter},
    layer::{Filter, SubscriberExt},
    util::SubscriberInitExt,
    Layer, Registry,
};

/// Name of the catch-all section in `logging:`.
const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// `None` switches the sink off. Unknown names fall back to INFO.
fn parse_level(raw: &str) -> Option<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => None,
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => Some(Level::INFO),
    }
}

/// `docstore` matches `docstore` and `docstore::memory`, not `docstore_extra`.
fn target_in(target: &str, subsystem: &str) -> bool {
    target
        .strip_prefix(subsystem)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- rotating file sink --------

/// A size-rotated log file shared by every layer that writes to it.
#[derive(Clone)]
struct FileSink(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl FileSink {
    /// Opens `path`, creating its parent directories first.
    fn open(path: &Path, max_bytes: usize, limit: FileLimit) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendTimestamp::default(limit),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

/// Writer handed to `fmt`; a missing sink swallows the record.
struct SinkWriter(Option<FileSink>);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.0 {
            Some(sink) => sink.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.0 {
            Some(sink) => sink.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Picks the file for a record from its target: the subsystem's own file
/// when it has one, the default file otherwise.
#[derive(Clone, Default)]
struct SinkRouter {
    fallback: Option<FileSink>,
    subsystems: BTreeMap<String, FileSink>,
}

impl SinkRouter {
    fn route(&self, target: &str) -> Option<FileSink> {
        self.subsystems
            .iter()
            .find(|(name, _)| target_in(target, name))
            .map(|(_, sink)| sink.clone())
            .or_else(|| self.fallback.clone())
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.subsystems.is_empty()
    }
}

impl<'a> MakeWriter<'a> for SinkRouter {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SinkWriter(self.route(meta.target()))
    }
}

// -------- plan --------

/// Relative paths are taken from `home_dir`.
fn resolve_log_path(file: &str, home_dir: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home_dir.join(path)
    }
}

/// Keep at most `max_backups` rotated files, else drop those older than
/// `max_age_days` (1 day when neither is set).
fn file_limit(section: &Section) -> FileLimit {
    match (section.max_backups, section.max_age_days) {
        (Some(n), _) => FileLimit::MaxFiles(n.max(1)),
        (None, Some(days)) => FileLimit::Age(chrono::Duration::days(i64::from(days.max(1)))),
        (None, None) => FileLimit::Age(chrono::Duration::days(1)),
    }
}

fn open_section_file(name: &str, section: &Section, home_dir: &Path) -> Option<FileSink> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, home_dir);
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    match FileSink::open(&path, max_bytes as usize, file_limit(section)) {
        Ok(sink) => Some(sink),
        Err(e) => {
            // The subscriber is not installed yet, so stderr is the only channel.
            eprintln!("logging: cannot open {} for '{name}': {e}", path.display());
            None
        }
    }
}

/// Everything the subscriber needs, derived from the `logging:` section.
struct LogPlan {
    /// Levels for targets that own a section.
    console: Targets,
    file: Targets,
    /// Names of the sections other than `default`.
    subsystems: Vec<String>,
    /// Levels of the `default` section, applied to every other target.
    fallback_console: Option<Level>,
    fallback_file: Option<Level>,
    router: SinkRouter,
}

impl LogPlan {
    fn build(cfg: &LoggingConfig, home_dir: &Path) -> Self {
        let mut console = Targets::new().with_default(LevelFilter::OFF);
        let mut file = Targets::new().with_default(LevelFilter::OFF);
        let mut subsystems = Vec::new();
        let mut router = SinkRouter::default();

        let mut sections: Vec<_> = cfg
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
            .collect();
        sections.sort_by(|a, b| a.0.cmp(b.0));

        for (name, section) in sections {
            subsystems.push(name.clone());
            if let Some(level) = parse_level(&section.console_level) {
                console = console.with_target(name.clone(), LevelFilter::from_level(level));
            }
            if let Some(sink) = open_section_file(name, section, home_dir) {
                router.subsystems.insert(name.clone(), sink);
                if let Some(level) = parse_level(&section.file_level) {
                    file = file.with_target(name.clone(), LevelFilter::from_level(level));
                }
            }
        }

        let default = cfg.get(DEFAULT_SECTION);
        router.fallback = default.and_then(|s| open_section_file(DEFAULT_SECTION, s, home_dir));
        let fallback_console = default.and_then(|s| parse_level(&s.console_level));
        let fallback_file = match (default, &router.fallback) {
            (Some(s), Some(_)) => parse_level(&s.file_level),
            _ => None,
        };

        Self {
            console,
            file,
            subsystems,
            fallback_console,
            fallback_file,
            router,
        }
    }

    /// Passes records outside every named subsystem, up to `max`.
    fn outside_subsystems(
        &self,
        max: Level,
    ) -> FilterFn<impl Fn(&Metadata<'_>) -> bool + Send + Sync + 'static> {
        let named = self.subsystems.clone();
        FilterFn::new(move |meta: &Metadata<'_>| {
            *meta.level() <= max && !named.iter().any(|n| target_in(meta.target(), n))
        })
    }
}

// -------- public init --------

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer<F>(ansi: bool, filter: F) -> BoxedLayer
where
    F: Filter<Registry> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(filter)
        .boxed()
}

fn file_layer<F>(router: SinkRouter, filter: F) -> BoxedLayer
where
    F: Filter<Registry> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(filter)
        .boxed()
}

/// Install the global subscriber described by `cfg`.
///
/// Each named section gets its own console level and optionally its own
/// rotating JSON file; the `default` section covers every other target.
/// Relative file paths resolve against `home_dir`. Calling this twice
/// keeps the first subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, home_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let plan = LogPlan::build(cfg, home_dir);
    let ansi = io::stdout().is_terminal();

    let mut layers = vec![console_layer(ansi, plan.console.clone())];
    if let Some(level) = plan.fallback_console {
        layers.push(console_layer(ansi, plan.outside_subsystems(level)));
    }
    if !plan.router.is_empty() {
        layers.push(file_layer(plan.router.clone(), plan.file.clone()));
        if let Some(level) = plan.fallback_file {
            layers.push(file_layer(plan.router.clone(), plan.outside_subsystems(level)));
        }
    }

    let _ = Registry::default().with(layers).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "warn".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_age_days: None,
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn levels_are_case_insensitive_and_off_disables() {
        assert_eq!(parse_level(" Debug "), Some(Level::DEBUG));
        assert_eq!(parse_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_level("off"), None);
        assert_eq!(parse_level("none"), None);
        assert_eq!(parse_level("chatty"), Some(Level::INFO));
    }

    #[test]
    fn subsystem_match_respects_module_boundaries() {
        assert!(target_in("docstore", "docstore"));
        assert!(target_in("docstore::memory", "docstore"));
        assert!(!target_in("docstore_extra", "docstore"));
        assert!(!target_in("devcamper", "docstore"));
    }

    #[test]
    fn retention_prefers_backups_over_age() {
        let mut s = default_logging_config()[DEFAULT_SECTION].clone();
        assert!(matches!(file_limit(&s), FileLimit::MaxFiles(3)));

        s.max_backups = None;
        s.max_age_days = Some(7);
        assert!(matches!(file_limit(&s), FileLimit::Age(d) if d == chrono::Duration::days(7)));

        s.max_age_days = None;
        assert!(matches!(file_limit(&s), FileLimit::Age(d) if d == chrono::Duration::days(1)));
    }

    #[test]
    fn relative_files_land_under_home_dir() {
        let home = Path::new("/srv/devcamper");
        assert_eq!(
            resolve_log_path("logs/api.log", home),
            PathBuf::from("/srv/devcamper/logs/api.log")
        );
        assert_eq!(resolve_log_path("/var/log/api.log", home), PathBuf::from("/var/log/api.log"));
    }

    #[test]
    fn sink_creates_missing_directories() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("deep/logs/api.log");
        FileSink::open(&path, 64 * 1024, FileLimit::MaxFiles(2)).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn router_prefers_subsystem_file_then_default() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("logs/all.log"));
        cfg.insert("docstore".into(), section("logs/store.log"));
        cfg.insert("devcamper".into(), section(""));

        let plan = LogPlan::build(&cfg, tmp.path());
        assert_eq!(plan.subsystems, vec!["devcamper".to_string(), "docstore".to_string()]);
        assert_eq!(plan.fallback_console, Some(Level::WARN));
        assert_eq!(plan.fallback_file, Some(Level::DEBUG));

        let store = plan.router.route("docstore::memory").unwrap();
        let all = plan.router.route("devcamper::api").unwrap();
        assert!(Arc::ptr_eq(&store.0, &plan.router.subsystems["docstore"].0));
        assert!(Arc::ptr_eq(&all.0, &plan.router.fallback.as_ref().unwrap().0));
    }

    #[test]
    fn empty_default_file_disables_fallback_file() {
        let tmp = tempdir().unwrap();
        let config_path = tmp.path().join("devcamper.yaml");
        let home = tmp.path().join("home").to_string_lossy().replace('\\', "/");
        std::fs::write(
            &config_path,
            format!(
                r#"
server:
  home_dir: "{home}"
logging:
  default:
    console_level: info
    file: ""
  devcamper:
    console_level: debug
    file: "logs/devcamper.log"
    file_level: warn
    max_backups: 2
"#
            ),
        )
        .unwrap();

        let config = AppConfig::load_layered(&config_path).unwrap();
        let plan = LogPlan::build(config.logging.as_ref().unwrap(), Path::new(&config.server.home_dir));

        assert!(plan.router.fallback.is_none());
        assert_eq!(plan.fallback_file, None);
        assert_eq!(plan.fallback_console, Some(Level::INFO));
        assert!(plan.router.route("api_ingress").is_none());
        assert!(Path::new(&home).join("logs").is_dir());
    }
}
