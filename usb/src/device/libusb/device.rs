use crate::device::base::{UsbBus, UsbDeviceIo};
use log::debug;
use pcsensor_types::UsbId;
use rusb::{Context, Device, DeviceHandle, UsbContext};
use std::time::Duration;

/// The real bus, backed by a libusb context owned for as long as this lives.
pub struct LibUsbBus {
    context: Context,
}

impl LibUsbBus {
    pub fn new() -> Result<Self, rusb::Error> {
        Ok(Self {
            context: Context::new()?,
        })
    }
}

impl UsbBus for LibUsbBus {
    type Device = Device<Context>;
    type Handle = DeviceHandle<Context>;

    fn devices(&self) -> rusb::Result<Vec<(Device<Context>, UsbId)>> {
        let mut found = Vec::new();
        for device in self.context.devices()?.iter() {
            match device.device_descriptor() {
                Ok(descriptor) => {
                    let id = UsbId::new(descriptor.vendor_id(), descriptor.product_id());
                    found.push((device, id));
                }
                Err(error) => debug!(
                    "Skipping device at {}:{}, no descriptor: {}",
                    device.bus_number(),
                    device.address(),
                    error
                ),
            }
        }
        Ok(found)
    }

    fn open(&self, device: &Device<Context>) -> rusb::Result<DeviceHandle<Context>> {
        debug!(
            "Opening device at {}:{}",
            device.bus_number(),
            device.address()
        );
        device.open()
    }
}

impl<T: UsbContext> UsbDeviceIo for DeviceHandle<T> {
    fn kernel_driver_active(&self, interface: u8) -> rusb::Result<bool> {
        DeviceHandle::kernel_driver_active(self, interface)
    }

    fn detach_kernel_driver(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::detach_kernel_driver(self, interface)
    }

    fn set_active_configuration(&mut self, config: u8) -> rusb::Result<()> {
        DeviceHandle::set_active_configuration(self, config)
    }

    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::claim_interface(self, interface)
    }

    fn release_interface(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::release_interface(self, interface)
    }

    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::write_control(self, request_type, request, value, index, data, timeout)
    }

    fn read_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::read_control(self, request_type, request, value, index, buf, timeout)
    }

    fn read_interrupt(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::read_interrupt(self, endpoint, buf, timeout)
    }
}
