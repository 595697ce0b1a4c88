// Polyglot - language negotiation and gettext catalogs for web applications
//
// Picks the language of every request from its URL, query string, cookie and
// Accept-Language header, and serves translated text from catalogs that can
// be reloaded while the application keeps running.

// Re-export the localization core
pub use polyglot_i18n::*;

// Re-export configuration
pub use polyglot_config;
pub use polyglot_config::LocalizationConfig;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable consulted for the log level when `RUST_LOG` is unset.
pub const LOG_LEVEL_ENV: &str = "POLYGLOT_LOG_LEVEL";

/// Install a formatting subscriber for the `tracing` output of this crate.
///
/// The filter comes from `RUST_LOG`, then `POLYGLOT_LOG_LEVEL`, then `info`.
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_LEVEL_ENV))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    install(filter);
}

/// Like [`init_tracing`], with an explicit filter directive such as
/// `"polyglot_i18n=debug,info"`.
pub fn init_tracing_with_level(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// A localizer built from configuration, with its catalog watcher when the
/// configuration enables one.
#[derive(Debug)]
pub struct Bootstrap {
    pub localizer: Localizer,
    /// Running while held; dropping it stops hot reload
    #[cfg(feature = "watch")]
    pub watcher: Option<WatchHandle>,
}

/// Load configuration, install logging and build a [`Localizer`].
///
/// `path` is an optional JSON, TOML or `.env` configuration file; values from
/// `POLYGLOT_*` environment variables override it. With `watch = true` the
/// catalog watcher is started as well, which requires a Tokio runtime.
pub fn bootstrap(path: Option<&std::path::Path>) -> Result<Bootstrap> {
    init_tracing();
    let config = LocalizationConfig::load(path)?;
    let localizer = Localizer::from_config(&config)?;

    #[cfg(feature = "watch")]
    let watcher = localizer.watch_if_enabled()?;
    #[cfg(not(feature = "watch"))]
    if localizer.watch_enabled() {
        tracing::warn!("`watch` is set but hot reload is not compiled in; enable the `watch` feature");
    }

    info!(languages = localizer.languages().len(), "Localization ready");

    Ok(Bootstrap {
        localizer,
        #[cfg(feature = "watch")]
        watcher,
    })
}

pub mod prelude {
    pub use polyglot_config::LocalizationConfig;
    pub use polyglot_i18n::prelude::*;
    pub use polyglot_i18n::{LanguageResolver, ResolverSettings, RequestLanguageContext};
}
