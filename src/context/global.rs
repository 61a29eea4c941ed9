//! The process-wide context slot.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;

use super::AppContext;
use crate::Error;

static CONTEXT: OnceLock<AppContext> = OnceLock::new();

impl AppContext {
    /// Publishes this context as the process-wide instance.
    ///
    /// Done once by the entry point. A second call fails with
    /// [`Error::AlreadyInitialized`] and drops the rejected context.
    pub fn install(self) -> Result<&'static AppContext, Error> {
        CONTEXT
            .set(self)
            .map_err(|_rejected| Error::AlreadyInitialized)?;
        Self::instance()
    }

    /// The process-wide context.
    ///
    /// Fails with [`Error::NotInitialized`] until [`install`](Self::install)
    /// has run; there is no default instance. The returned reference is
    /// `'static`, so callers can keep it instead of asking again.
    pub fn instance() -> Result<&'static AppContext, Error> {
        CONTEXT.get().ok_or(Error::NotInitialized)
    }

    pub fn is_installed() -> bool {
        CONTEXT.get().is_some()
    }
}

/// Reads `key` from the installed context's configuration.
///
/// `Ok(None)` if the key is absent or has another shape than `T`.
pub fn config<T: DeserializeOwned>(key: &str) -> Result<Option<T>, Error> {
    Ok(AppContext::instance()?.config().get(key))
}

/// Writes `key` in the installed context's configuration.
pub fn set_config(key: &str, value: impl Into<toml::Value>) -> Result<(), Error> {
    AppContext::instance()?.config_mut().set(key, value)?;
    Ok(())
}

/// A copy of the installed context's whole configuration.
pub fn config_all() -> Result<toml::Table, Error> {
    Ok(AppContext::instance()?.config().all().clone())
}
