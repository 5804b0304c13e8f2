use crate::commands::{CONFIGURATION, INTERFACE_0, INTERFACE_1};
use crate::error::ConnectError;
use log::{debug, info, warn};
use pcsensor_types::{SensorVariant, UsbId};
use rusb::{Direction, Recipient, RequestType};
use std::time::Duration;

pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(5000);

const INTERFACES: [u8; 2] = [INTERFACE_0, INTERFACE_1];

// The handful of libusb handle calls the sensors need. Mirrors rusb::DeviceHandle so the
// sequencing above it can be driven by something other than real hardware.
pub trait UsbDeviceIo {
    fn kernel_driver_active(&self, interface: u8) -> rusb::Result<bool>;
    fn detach_kernel_driver(&mut self, interface: u8) -> rusb::Result<()>;
    fn set_active_configuration(&mut self, config: u8) -> rusb::Result<()>;
    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()>;
    fn release_interface(&mut self, interface: u8) -> rusb::Result<()>;

    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;

    fn read_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;

    fn read_interrupt(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

pub trait UsbBus {
    type Device;
    type Handle: UsbDeviceIo + 'static;

    /// Every attached device whose descriptor could be read, in enumeration order.
    fn devices(&self) -> rusb::Result<Vec<(Self::Device, UsbId)>>;
    fn open(&self, device: &Self::Device) -> rusb::Result<Self::Handle>;
}

/// Returns the first attached device that matches one of the known sensors.
pub fn find_device<B: UsbBus>(
    bus: &B,
    known: &[SensorVariant],
) -> Result<(B::Device, SensorVariant), ConnectError> {
    for (device, id) in bus.devices()? {
        if let Some(variant) = known.iter().find(|variant| variant.usb_id() == id) {
            debug!("Matched {} as {}", id, variant);
            return Ok((device, *variant));
        }
    }
    Err(ConnectError::DeviceNotFound)
}

// An opened sensor with both interfaces claimed. Whatever has been claimed is released when
// this is dropped, including when open() bails half way through.
#[derive(Debug)]
pub struct UsbLink<H: UsbDeviceIo> {
    handle: H,
    claimed: Vec<u8>,
    timeout: Duration,
}

impl<H: UsbDeviceIo> UsbLink<H> {
    pub fn open<B: UsbBus<Handle = H>>(bus: &B, device: &B::Device) -> Result<Self, ConnectError> {
        let handle = bus.open(device)?;
        let mut link = Self {
            handle,
            claimed: Vec::with_capacity(INTERFACES.len()),
            timeout: TRANSFER_TIMEOUT,
        };

        for interface in INTERFACES {
            // Some platforms can't answer this at all, treat that as nothing being bound.
            if link.handle.kernel_driver_active(interface).unwrap_or(false) {
                debug!("Detaching kernel driver from interface {}", interface);
                link.handle
                    .detach_kernel_driver(interface)
                    .map_err(|source| ConnectError::DriverDetachFailed { interface, source })?;
            }
        }

        link.handle
            .set_active_configuration(CONFIGURATION)
            .map_err(ConnectError::ConfigurationFailed)?;

        for interface in INTERFACES {
            link.handle
                .claim_interface(interface)
                .map_err(|source| ConnectError::InterfaceClaimFailed { interface, source })?;
            link.claimed.push(interface);
        }

        info!("Opened sensor, interfaces {:?} claimed", link.claimed);
        Ok(link)
    }

    pub fn write_class_control(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> Result<usize, rusb::Error> {
        self.handle.write_control(
            rusb::request_type(Direction::Out, RequestType::Class, Recipient::Interface),
            request,
            value,
            index,
            data,
            self.timeout,
        )
    }

    /// May hand back fewer than `length` bytes, callers need to check.
    pub fn read_class_control(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        length: usize,
    ) -> Result<Vec<u8>, rusb::Error> {
        let mut buf = vec![0; length];
        let response_length = self.handle.read_control(
            rusb::request_type(Direction::In, RequestType::Class, Recipient::Interface),
            request,
            value,
            index,
            &mut buf,
            self.timeout,
        )?;
        buf.truncate(response_length);
        Ok(buf)
    }

    /// Always `length` bytes long, anything the device didn't send stays zeroed.
    pub fn read_interrupt(&mut self, endpoint: u8, length: usize) -> Result<Vec<u8>, rusb::Error> {
        let mut buf = vec![0; length];
        let received = self.handle.read_interrupt(endpoint, &mut buf, self.timeout)?;
        if received < length {
            debug!("Interrupt read returned {} of {} bytes", received, length);
        }
        Ok(buf)
    }

    pub fn close(self) {
        drop(self);
    }

    fn release(&mut self) {
        while let Some(interface) = self.claimed.pop() {
            if let Err(error) = self.handle.release_interface(interface) {
                warn!("Unable to release interface {}: {}", interface, error);
            }
        }
    }
}

impl<H: UsbDeviceIo> Drop for UsbLink<H> {
    fn drop(&mut self) {
        if !self.claimed.is_empty() {
            debug!("Releasing interfaces {:?}", self.claimed);
        }
        self.release();
    }
}
