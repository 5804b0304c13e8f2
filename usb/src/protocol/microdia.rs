use crate::commands::{MICRODIA_INIT, MICRODIA_READ};
use crate::device::base::{UsbDeviceIo, UsbLink};
use crate::error::{ConnectError, ReadError};
use crate::protocol::{read_data, run_sequence, SensorProtocol};
use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};
use pcsensor_types::{RawReading, SensorVariant};

/// 0c45:7401. Commands and the reading both travel over control transfers.
pub struct Microdia;

impl Microdia {
    // The high byte is signed, so 0xff 0x00 is -1 degree, not 255.
    pub fn decode(data: &[u8]) -> Result<RawReading, ReadError> {
        if data.len() < 2 {
            return Err(ReadError::ShortRead {
                expected: 2,
                received: data.len(),
            });
        }
        Ok(RawReading(BigEndian::read_i16(&data[0..2]) as i32))
    }
}

impl SensorProtocol for Microdia {
    const VARIANT: SensorVariant = SensorVariant::Microdia;

    fn initialise<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<(), ConnectError> {
        // Nothing in here is allowed to abort, the device is usable even if it sulks.
        if let Err((step, error)) = run_sequence(link, MICRODIA_INIT) {
            warn!("Initialisation step {:?} failed: {}", step, error);
        }
        debug!("Microdia sensor initialised");
        Ok(())
    }

    fn read_raw<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<RawReading, ReadError> {
        if let Err((step, error)) = run_sequence(link, MICRODIA_READ) {
            warn!("Read step {:?} failed: {}", step, error);
        }
        let data = read_data(link)?;
        Microdia::decode(&data)
    }
}
