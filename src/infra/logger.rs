use env_logger::Builder;
use log::{Level, debug};
use std::io::Write;

pub const LOG_LEVEL_ENV: &str = "README_AGENT_LOG_LEVEL";

pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let level = level_for_verbosity(verbosity);
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level);

    Builder::from_env(env)
        .format(|buf, record| {
            let level_color = match record.level() {
                Level::Error => "31", // Red
                Level::Warn => "33",  // Yellow
                Level::Info => "32",  // Green
                Level::Debug => "36", // Cyan
                Level::Trace => "35", // Magenta
            };

            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()?;

    debug!("Logger initialized at level {}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[test]
    fn test_setup_logger() {
        INIT.call_once(|| {
            assert!(setup_logger(0).is_ok());
        });
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "error");
        assert_eq!(level_for_verbosity(1), "warn");
        assert_eq!(level_for_verbosity(2), "info");
        assert_eq!(level_for_verbosity(7), "debug");
    }
}
