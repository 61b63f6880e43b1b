use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. `format` is one of
/// `json`, `pretty` or `compact`.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}
