use clap::{Parser, ValueEnum};

// From a one-off comparison against a reference thermometer.
pub const DEFAULT_SCALE: f32 = 1.108_910_9;
pub const DEFAULT_OFFSET: f32 = -2.899_009_9;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Cli {
    /// Minimum log level to print out (logs go to stderr)
    #[clap(long, value_enum, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Multiplier applied to the sensor reading
    #[clap(long, default_value_t = DEFAULT_SCALE, allow_hyphen_values = true)]
    pub scale: f32,

    /// Added to the reading after scaling
    #[clap(long, default_value_t = DEFAULT_OFFSET, allow_hyphen_values = true)]
    pub offset: f32,

    /// Print the reading exactly as the sensor reports it, ignoring --scale and --offset
    #[clap(long)]
    pub raw: bool,

    /// How many times to try for a usable reading before giving up
    #[clap(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: u32,

    /// Seconds to wait after the sensor fails to open
    #[clap(long, default_value = "3")]
    pub retry_delay: u64,

    /// Keep running, printing a reading every this many seconds
    #[clap(long)]
    pub interval: Option<u64>,
}

#[repr(usize)]
#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum LevelFilter {
    /// A level lower than all log levels.
    Off,
    /// Corresponds to the `Error` log level.
    Error,
    /// Corresponds to the `Warn` log level.
    Warn,
    /// Corresponds to the `Info` log level.
    Info,
    /// Corresponds to the `Debug` log level.
    Debug,
    /// Corresponds to the `Trace` log level.
    Trace,
}

impl From<LevelFilter> for log::LevelFilter {
    fn from(level: LevelFilter) -> Self {
        match level {
            LevelFilter::Off => log::LevelFilter::Off,
            LevelFilter::Error => log::LevelFilter::Error,
            LevelFilter::Warn => log::LevelFilter::Warn,
            LevelFilter::Info => log::LevelFilter::Info,
            LevelFilter::Debug => log::LevelFilter::Debug,
            LevelFilter::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["pcsensor"]);
        assert_eq!(cli.log_level, LevelFilter::Warn);
        assert_eq!(cli.attempts, 4);
        assert_eq!(cli.retry_delay, 3);
        assert_eq!(cli.interval, None);
        assert_eq!(cli.scale, DEFAULT_SCALE);
        assert_eq!(cli.offset, DEFAULT_OFFSET);
        assert!(!cli.raw);
    }

    #[test]
    fn negative_offsets_parse() {
        let cli = Cli::parse_from(["pcsensor", "--offset", "-1.5", "--scale", "1"]);
        assert_eq!(cli.offset, -1.5);
        assert_eq!(cli.scale, 1.0);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert!(Cli::try_parse_from(["pcsensor", "--attempts", "0"]).is_err());
    }
}
