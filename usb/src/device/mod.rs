pub mod base;

// Linux and MacOS both go through libusb, there's no vendor driver to talk to.
mod libusb;
pub use crate::device::libusb::device::LibUsbBus;

#[cfg(test)]
pub(crate) mod mock;
