use anyhow::Result;
use log::LevelFilter;

/// Initialize terminal logging.
///
/// An explicit `log_level` sets the level for every target; without one,
/// `RUST_LOG` applies and falls back to `info`.
pub fn init_logging(log_level: Option<&str>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(level) = log_level {
        builder.filter_level(parse_level(level));
    }

    builder.try_init()?;
    log::debug!(
        "Logging initialized (level: {})",
        log_level.unwrap_or("from environment")
    );
    Ok(())
}

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warning"), LevelFilter::Warn);
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
    }
}
