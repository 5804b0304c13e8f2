use crate::device::base::{find_device, UsbBus, UsbLink};
use crate::error::{ConnectError, ReadError};
use crate::protocol::{attach_variant, ActiveSensor};
use log::{debug, info, warn};
use pcsensor_types::{SensorVariant, Temperature};
use strum::IntoEnumIterator;

/// Handed back by [`Sensor::temperature`] when no reading could be taken. It's the smallest
/// positive normal float, which a real sensor never reports.
pub const INVALID_READING: f32 = f32::MIN_POSITIVE;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensorState {
    Closed,
    Opening,
    Initializing,
    Ready,
}

/// A connection to a single USB thermometer.
///
/// Starts out closed. [`Sensor::open`] finds the first supported device on the bus, claims
/// it and runs its initialisation sequence; from then on the device's variant decides how
/// every read is performed until [`Sensor::close`] (or drop) releases it again.
pub struct Sensor<B: UsbBus> {
    bus: B,
    active: Option<Box<dyn ActiveSensor>>,
    state: SensorState,
}

impl<B: UsbBus> Sensor<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            active: None,
            state: SensorState::Closed,
        }
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn variant(&self) -> Option<SensorVariant> {
        self.active.as_ref().map(|active| active.variant())
    }

    pub fn open(&mut self) -> Result<(), ConnectError> {
        if self.active.is_some() {
            debug!("Sensor already open, reopening");
            self.close();
        }

        self.state = SensorState::Opening;
        let known: Vec<SensorVariant> = SensorVariant::iter().collect();
        let link = find_device(&self.bus, &known).and_then(|(device, variant)| {
            info!("Found {} sensor ({})", variant, variant.usb_id());
            UsbLink::open(&self.bus, &device).map(|link| (link, variant))
        });
        let (link, variant) = match link {
            Ok(found) => found,
            Err(error) => {
                self.state = SensorState::Closed;
                return Err(error);
            }
        };

        self.state = SensorState::Initializing;
        match attach_variant(variant, link) {
            Ok(active) => {
                self.active = Some(active);
                self.state = SensorState::Ready;
                debug!("{} sensor ready", variant);
                Ok(())
            }
            Err(error) => {
                self.state = SensorState::Closed;
                Err(error)
            }
        }
    }

    pub fn read_temperature(&mut self) -> Result<Temperature, ReadError> {
        let active = self.active.as_mut().ok_or(ReadError::NotOpen)?;
        let raw = active.read_raw()?;
        let temperature = Temperature::from_raw(raw);
        debug!("Raw reading {} -> {}C", raw.0, temperature);
        Ok(temperature)
    }

    /// Like [`Sensor::read_temperature`], but reports any failure as [`INVALID_READING`].
    pub fn temperature(&mut self) -> f32 {
        match self.read_temperature() {
            Ok(temperature) => temperature.celsius(),
            Err(error) => {
                warn!("Unable to read temperature: {}", error);
                INVALID_READING
            }
        }
    }

    /// Releases the device. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Closing {} sensor", active.variant());
            active.close();
        }
        self.state = SensorState::Closed;
    }
}

impl<B: UsbBus> Drop for Sensor<B> {
    fn drop(&mut self) {
        self.close();
    }
}
