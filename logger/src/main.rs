use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use log::{error, info};
use pcsensor_types::Temperature;
use pcsensor_usb::{LibUsbBus, Sensor};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::thread::sleep;
use std::time::Duration;

use crate::calibration::Calibration;
use crate::cli::Cli;
use crate::poll::{poll_temperature, sample_once, PollOutcome};

mod calibration;
mod cli;
mod poll;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    CombinedLogger::init(vec![TermLogger::new(
        args.log_level.into(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    info!("Starting pcsensor v{}", VERSION);

    let calibration = match args.raw {
        true => Calibration::IDENTITY,
        false => Calibration {
            scale: args.scale,
            offset: args.offset,
        },
    };
    let retry_delay = Duration::from_secs(args.retry_delay);

    let bus = LibUsbBus::new().context("Unable to initialise libusb")?;
    let mut sensor = Sensor::new(bus);
    let mut poll = || poll_temperature(args.attempts, retry_delay, || sample_once(&mut sensor));

    let Some(interval) = args.interval else {
        return match poll() {
            PollOutcome::Reading(temperature) => {
                println!("{}", format_line(Local::now(), calibration.apply(temperature)));
                Ok(())
            }
            PollOutcome::Exhausted { attempts } => {
                error!("No reading from the sensor after {} attempts", attempts);
                std::process::exit(1);
            }
        };
    };

    let interval = Duration::from_secs(interval);
    loop {
        match poll() {
            PollOutcome::Reading(temperature) => {
                println!("{}", format_line(Local::now(), calibration.apply(temperature)));
            }
            PollOutcome::Exhausted { attempts } => {
                error!("No reading from the sensor after {} attempts", attempts);
            }
        }
        sleep(interval);
    }
}

fn format_line(timestamp: DateTime<Local>, temperature: Temperature) -> String {
    format!("{},{}", timestamp.format("%Y-%m-%d %H:%M:%S"), temperature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn output_line_format() {
        let timestamp = Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .unwrap();
        assert_eq!(
            format_line(timestamp, Temperature(21.5)),
            "2024-03-09 07:05:01,21.500000"
        );
        assert_eq!(
            format_line(timestamp, Temperature(-3.25)),
            "2024-03-09 07:05:01,-3.250000"
        );
    }
}
