use std::fmt::Formatter;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// A USB vendor / product pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UsbId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbId {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl std::fmt::Display for UsbId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

pub const VID_MICRODIA: u16 = 0x0c45;
pub const PID_TEMPER_MICRODIA: u16 = 0x7401;

pub const VID_TENX: u16 = 0x1130;
pub const PID_TEMPER_TENX: u16 = 0x660c;

/// The two known sensor designs. Each speaks its own command set, so the
/// variant picked when a device is opened holds for as long as it stays open.
#[derive(Copy, Clone, Debug, Display, EnumIter, EnumCount, PartialEq, Eq, Hash)]
pub enum SensorVariant {
    /// 0c45:7401, polled entirely over control transfers.
    Microdia,
    /// 1130:660c, answers on interrupt endpoint 0x82.
    Tenx,
}

impl SensorVariant {
    pub const fn usb_id(&self) -> UsbId {
        match self {
            SensorVariant::Microdia => UsbId::new(VID_MICRODIA, PID_TEMPER_MICRODIA),
            SensorVariant::Tenx => UsbId::new(VID_TENX, PID_TEMPER_TENX),
        }
    }

    pub fn from_usb_id(id: UsbId) -> Option<Self> {
        SensorVariant::iter().find(|variant| variant.usb_id() == id)
    }
}

/// The undecoded 16 bit value pulled out of a response buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawReading(pub i32);

/// Degrees Celsius, as reported by the sensor before any calibration.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Temperature(pub f32);

impl Temperature {
    // 125 degrees spread over a 32000 step range.
    const DEGREES_PER_STEP: f64 = 125.0 / 32000.0;

    pub fn from_raw(raw: RawReading) -> Self {
        Temperature((raw.0 as f64 * Self::DEGREES_PER_STEP) as f32)
    }

    pub fn celsius(&self) -> f32 {
        self.0
    }
}

impl From<RawReading> for Temperature {
    fn from(raw: RawReading) -> Self {
        Temperature::from_raw(raw)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
