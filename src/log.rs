//! Logger setup. Diagnostics throughout the crate go through the `log`
//! macros; this wires them to a console appender. Anomaly reports (negative
//! pools, over-moves) come out at `warn`, per-day denominator sums at `debug`.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes a console logger at the given level. Safe to call more than
/// once; only the first call configures the global logger.
pub fn init_logger(level: LevelFilter) {
    INIT.call_once(|| {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {l} {t} - {m}{n}")))
            .build();

        let config = Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(level));

        match config {
            Ok(config) => {
                // Another logger may already be installed (e.g. by a test
                // harness); that is not our problem to fix.
                let _ = log4rs::init_config(config);
            }
            Err(e) => eprintln!("failed to configure logging: {e}"),
        }
    });
}
