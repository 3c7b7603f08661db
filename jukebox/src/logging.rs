use jukeconfig::Config;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installe le subscriber global.
///
/// Le niveau vient de `host.logger.min_level` ; la variable `RUST_LOG`,
/// si elle est définie, a priorité.
pub fn init_logging(config: &Config) {
    let log_level = match config.get_log_min_level() {
        Ok(l) => match string_to_level(&l) {
            Some(lev) => LevelFilter::from_level(lev),
            None => LevelFilter::TRACE,
        },
        Err(_) => LevelFilter::INFO,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let subscriber = Registry::default().with(filter);

    let enable_console = config.get_log_enable_console().unwrap_or(true);
    let ansi = config.get_log_ansi().unwrap_or(true);

    if enable_console {
        // stdout est réservé aux trames de l'afficheur
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(ansi),
            )
            .init();
    } else {
        subscriber.init();
    }
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}
