pub use pcsensor_types;
pub use rusb;

pub mod commands;
pub mod error;
pub mod protocol;
pub mod sensor;

mod device;

pub use device::base::{find_device, UsbBus, UsbDeviceIo, UsbLink, TRANSFER_TIMEOUT};
pub use device::LibUsbBus;
pub use sensor::{Sensor, SensorState, INVALID_READING};
