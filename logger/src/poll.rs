use log::{debug, warn};
use pcsensor_types::Temperature;
use pcsensor_usb::error::{ConnectError, ReadError};
use pcsensor_usb::{Sensor, UsbBus};
use std::thread::sleep;
use std::time::Duration;

// The sensors answer with a flat zero when they haven't produced anything yet.
const ZERO_THRESHOLD: f32 = 0.0001;

#[derive(Debug)]
pub enum Sample {
    OpenFailed(ConnectError),
    ReadFailed(ReadError),
    Reading(Temperature),
}

#[derive(Debug, PartialEq)]
pub enum PollOutcome {
    Reading(Temperature),
    Exhausted { attempts: u32 },
}

/// Opens the sensor, takes one reading and closes it again.
pub fn sample_once<B: UsbBus>(sensor: &mut Sensor<B>) -> Sample {
    if let Err(error) = sensor.open() {
        return Sample::OpenFailed(error);
    }
    let result = sensor.read_temperature();
    sensor.close();

    match result {
        Ok(temperature) => Sample::Reading(temperature),
        Err(error) => Sample::ReadFailed(error),
    }
}

/// Keeps sampling until something other than zero comes back, or `attempts` runs out.
pub fn poll_temperature<F>(attempts: u32, retry_delay: Duration, mut sample: F) -> PollOutcome
where
    F: FnMut() -> Sample,
{
    for attempt in 1..=attempts {
        match sample() {
            Sample::Reading(temperature) if temperature.celsius().abs() >= ZERO_THRESHOLD => {
                debug!("Attempt {}: {}C", attempt, temperature);
                return PollOutcome::Reading(temperature);
            }
            Sample::Reading(_) => {
                debug!("Attempt {} of {}: sensor read zero", attempt, attempts);
            }
            Sample::ReadFailed(error) => {
                warn!("Attempt {} of {}: {}", attempt, attempts, error);
            }
            Sample::OpenFailed(error) => {
                warn!("Attempt {} of {}: {}", attempt, attempts, error);
                // Opening fails now and again while the device settles.
                if attempt < attempts {
                    sleep(retry_delay);
                }
            }
        }
    }
    PollOutcome::Exhausted { attempts }
}
