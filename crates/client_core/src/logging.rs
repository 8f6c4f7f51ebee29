use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

pub const DEFAULT_LOG_FILTER: &str = "info";

pub type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Installs the global subscriber filtered by `RUST_LOG`, or `info` when unset.
///
/// Call this before `load_settings` so warnings about the settings file are not dropped, then
/// hand the settings' filter to [`apply_log_filter`].
pub fn init_logging() -> LogFilterHandle {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

pub fn apply_log_filter(handle: &LogFilterHandle, directives: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter '{directives}'"))?;
    handle
        .reload(filter)
        .context("log subscriber is no longer installed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reloads_valid_filters_and_rejects_bad_ones() {
        let (layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(layer);

        apply_log_filter(&handle, "client_core=debug,warn").expect("valid filter");
        assert!(apply_log_filter(&handle, "client_core=loud").is_err());
    }

    #[test]
    fn reload_fails_once_the_subscriber_is_dropped() {
        let (layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        drop(tracing_subscriber::registry().with(layer));

        assert!(apply_log_filter(&handle, "debug").is_err());
    }
}
