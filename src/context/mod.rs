//! Application context: configuration, the current request and shared services.

mod global;
mod instances;
mod vars;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use http::request::Parts;
use http::StatusCode;
use toml::Value;

use crate::config::{Config, ConfigError, Settings};
use crate::halt::{escape_html, Halt};
use crate::loader::Loader;
use crate::paths::Paths;
use crate::request::{inbound_host, Request};
use crate::Error;

pub use global::{config, config_all, set_config};
pub use instances::Instances;
pub use vars::Vars;

/// Timezone used when the `timezone` key is absent.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Entry in the `domain` list that admits every host.
pub const ANY_HOST: &str = "0.0.0.0";

/// Central application context for one request-handling lifetime.
///
/// Built once through [`AppContext::builder`], which runs the startup steps in
/// a fixed order:
///
/// 1. record the start time
/// 2. resolve [`Paths`]
/// 3. load configuration, read `debug` and parse `timezone`
/// 4. check the inbound host against the `domain` allow-list
/// 5. build the [`Request`] and take its id as the session id
/// 6. hand the `namespace` map to the [`Loader`]
///
/// A host that is not allowed stops construction at step 4 with
/// [`Error::Halt`]; the request is never built and the loader never touched.
///
/// ## Example
///
/// ```no_run
/// use dragon_web::{AppContext, Config, NamespaceLoader};
///
/// let request = http::Request::builder()
///     .uri("/")
///     .header("host", "example.com")
///     .body(())?;
///
/// let mut loader = NamespaceLoader::new();
/// let ctx = AppContext::builder()
///     .with_config(Config::builder().with_file("config/app.toml", true))
///     .with_request(request)
///     .build(&mut loader)?
///     .install()?;
///
/// let mailer = ctx.get_or_create_instance("mailer", || String::from("smtp://localhost"));
/// println!("{} after {:.3}s", mailer, ctx.calc_app_time());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AppContext {
    start_time: Instant,
    paths: Paths,
    config: RwLock<Settings>,
    debug: bool,
    timezone: Tz,
    request: Request,
    session_id: String,
    instances: Instances,
    vars: Vars,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// Read access to the configuration.
    pub fn config(&self) -> RwLockReadGuard<'_, Settings> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the configuration. Only the contents change; the
    /// startup-derived values (`debug`, `timezone`) do not follow later writes.
    pub fn config_mut(&self) -> RwLockWriteGuard<'_, Settings> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The current wall-clock time in the configured timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Seconds elapsed since construction began.
    pub fn calc_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// The cached `T` named `name`, built by `factory` on first request.
    pub fn get_or_create_instance<T, F>(&self, name: &str, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.instances.get_or_create(name, factory)
    }

    /// Fallible form of [`get_or_create_instance`](Self::get_or_create_instance).
    /// Factory errors pass through untouched.
    pub fn try_get_or_create_instance<T, E, F>(&self, name: &str, factory: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, E>,
    {
        self.instances.try_get_or_create(name, factory)
    }

    pub fn instances(&self) -> &Instances {
        &self.instances
    }

    /// Releases all cached instances. Also done when the context is dropped.
    pub fn destroy_instances(&self) {
        self.instances.destroy();
    }

    /// Stores a scratch value for the rest of this request.
    pub fn set<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.vars.set(name, value);
    }

    /// Reads a scratch value, or `default` if unset or of another type.
    pub fn get<T: Any + Clone>(&self, name: &str, default: T) -> T {
        self.vars.get(name, default)
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.instances.destroy();
    }
}

/// How the builder obtains configuration.
#[derive(Debug)]
enum ConfigInput {
    Loaded(Settings),
    Pending(Config),
}

/// Builder for constructing an [`AppContext`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    paths: Option<Paths>,
    config: Option<ConfigInput>,
    request: Option<Parts>,
}

impl AppContextBuilder {
    /// Uses these directories instead of ones derived from the working directory.
    pub fn with_paths(mut self, paths: Paths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Uses an already loaded configuration.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.config = Some(ConfigInput::Loaded(settings));
        self
    }

    /// Loads this configuration during construction.
    ///
    /// Without this or [`with_settings`](Self::with_settings), `app.toml`
    /// (required) and `local.toml` (optional) from the config directory are
    /// loaded, followed by `APP__*` environment overrides.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(ConfigInput::Pending(config));
        self
    }

    pub fn with_request<B>(self, request: http::Request<B>) -> Self {
        self.with_request_parts(request.into_parts().0)
    }

    pub fn with_request_parts(mut self, parts: Parts) -> Self {
        self.request = Some(parts);
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Returns [`Error::Halt`] if the inbound host is not allow-listed, and
    /// [`Error::MissingRequest`] if no request was given.
    pub fn build(self, loader: &mut dyn Loader) -> Result<AppContext, Error> {
        let start_time = Instant::now();

        let paths = match self.paths {
            Some(paths) => paths,
            None => {
                let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                Paths::builder(root).resolve()
            }
        };

        let settings = match self.config {
            Some(ConfigInput::Loaded(settings)) => settings,
            Some(ConfigInput::Pending(config)) => config.load()?,
            None => default_config(&paths).load()?,
        };
        let is_debug = settings.get_or("debug", false);
        let timezone = configured_timezone(&settings)?;
        tracing::debug!(debug = is_debug, timezone = timezone.name(), "configuration loaded");

        let parts = self.request.ok_or(Error::MissingRequest)?;
        let host = inbound_host(&parts.headers, &parts.uri);
        let allowed = allowed_domains(&settings)?;
        check_domain(allowed.as_deref(), &host)?;

        let request = Request::from_parts(parts);
        let session_id = request.id().to_string();

        loader.set_namespace(&namespaces(&settings, &paths));

        tracing::info!(
            session_id = %session_id,
            host = %host,
            debug = is_debug,
            "application context ready"
        );

        Ok(AppContext {
            start_time,
            paths,
            config: RwLock::new(settings),
            debug: is_debug,
            timezone,
            request,
            session_id,
            instances: Instances::new(),
            vars: Vars::new(),
        })
    }
}

fn default_config(paths: &Paths) -> Config {
    Config::builder()
        .with_file(paths.config().join("app.toml"), true)
        .with_file(paths.config().join("local.toml"), false)
        .with_env("APP", "__")
}

/// The `timezone` key parsed as an IANA zone name, [`DEFAULT_TIMEZONE`] when absent.
fn configured_timezone(settings: &Settings) -> Result<Tz, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: "timezone".to_string(),
        reason,
    };

    let name = match settings.value("timezone") {
        None => DEFAULT_TIMEZONE,
        Some(Value::String(name)) => name.as_str(),
        Some(other) => {
            return Err(invalid(format!(
                "expected a string, found {}",
                other.type_str()
            )))
        }
    };
    name.parse::<Tz>()
        .map_err(|_| invalid(format!("unknown timezone '{name}'")))
}

/// The `domain` key as a list. A single string counts as a one-entry list.
///
/// `None` only when the key is absent; any other shape than a string or an
/// array of strings is an error, never an open guard.
fn allowed_domains(settings: &Settings) -> Result<Option<Vec<String>>, ConfigError> {
    let invalid = |found: &str| ConfigError::InvalidValue {
        key: "domain".to_string(),
        reason: format!("expected a string or an array of strings, found {found}"),
    };

    match settings.value("domain") {
        None => Ok(None),
        Some(Value::String(host)) => Ok(Some(vec![host.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(host) => Ok(host.clone()),
                other => Err(invalid(other.type_str())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(invalid(other.type_str())),
    }
}

/// Admits `host` if the allow-list contains it verbatim or contains [`ANY_HOST`].
///
/// Without a `domain` key every host is admitted.
fn check_domain(allowed: Option<&[String]>, host: &str) -> Result<(), Halt> {
    let Some(allowed) = allowed else {
        tracing::debug!(host, "no domain allow-list configured");
        return Ok(());
    };

    if allowed.iter().any(|d| d == ANY_HOST || d == host) {
        return Ok(());
    }

    tracing::warn!(host, "rejected request for unlisted domain");
    Err(Halt::plain(
        StatusCode::FORBIDDEN,
        format!("domain not allowed: {}", escape_html(host)),
    ))
}

/// The `namespace` table, with relative directories taken from the root path.
fn namespaces(settings: &Settings, paths: &Paths) -> BTreeMap<String, PathBuf> {
    settings
        .get::<BTreeMap<String, PathBuf>>("namespace")
        .unwrap_or_default()
        .into_iter()
        .map(|(ns, dir)| {
            let dir = if dir.is_relative() {
                paths.root().join(dir)
            } else {
                dir
            };
            (ns, dir)
        })
        .collect()
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
