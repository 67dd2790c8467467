//! Log output setup.

use std::io;

use tracing::Level;

/// Picks the log level: each `-v` raises it above the configured level.
pub fn log_level(verbose: u8, configured: &str) -> Level {
    let base = configured.parse::<Level>().unwrap_or(Level::WARN);
    match verbose {
        0 => base,
        1 => base.max(Level::INFO),
        2 => base.max(Level::DEBUG),
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber writing to stderr.
pub fn init(verbose: u8, configured: &str) {
    let level = log_level(verbose, configured);
    if let Err(e) = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("warning: could not initialize logging: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_without_flags() {
        assert_eq!(log_level(0, "warn"), Level::WARN);
        assert_eq!(log_level(0, "debug"), Level::DEBUG);
        assert_eq!(log_level(0, "ERROR"), Level::ERROR);
    }

    #[test]
    fn unknown_level_falls_back_to_warn() {
        assert_eq!(log_level(0, "loud"), Level::WARN);
    }

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(log_level(1, "warn"), Level::INFO);
        assert_eq!(log_level(2, "warn"), Level::DEBUG);
        assert_eq!(log_level(3, "warn"), Level::TRACE);
        // Never lowers a more verbose configured level
        assert_eq!(log_level(1, "trace"), Level::TRACE);
    }
}
