// Based on https://github.com/estk/log4rs/pull/295

use anyhow::Context;
use log::LevelFilter;
use log4rs::Handle;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_FILE_PATH: &str = "log/mailer.log";
const LOG_ARCHIVE_PATTERN: &str = "log/mailer_{}.log";
const LOG_FILE_MAX_BYTES: u64 = 2 * 1024 * 1024;
const LOG_ARCHIVE_COUNT: u32 = 10;

/// Logs to stderr at `level` and to a rolling file that also keeps everything at `level`
///
/// Keep the returned handle alive for the life of the program.
pub fn init_logging(level: LevelFilter) -> anyhow::Result<Handle> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} - {m}{n}")))
        .build();

    let trigger = SizeTrigger::new(LOG_FILE_MAX_BYTES);
    let roller = FixedWindowRoller::builder()
        .build(LOG_ARCHIVE_PATTERN, LOG_ARCHIVE_COUNT)
        .map_err(anyhow::Error::msg)
        .context("Failed to create FixedWindowRoller")?;
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    // Pattern: https://docs.rs/log4rs/*/log4rs/encode/pattern/index.html
    let log_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}",
        )))
        .build(LOG_FILE_PATH, Box::new(policy))
        .with_context(|| format!("Failed to open log file {LOG_FILE_PATH:?}"))?;

    let config = Config::builder()
        .appender(Appender::builder().build("log_file", Box::new(log_file)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(
            Root::builder()
                .appender("log_file")
                .appender("stderr")
                .build(level),
        )
        .context("Failed to configure logging")?;

    let handle = log4rs::init_config(config).context("Failed to init_config")?;

    Ok(handle)
}
