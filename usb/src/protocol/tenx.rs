use crate::commands::{Frame, FRAME_LENGTH, TENX_INIT};
use crate::device::base::{UsbDeviceIo, UsbLink};
use crate::error::{ConnectError, ReadError};
use crate::protocol::{read_answer, run_sequence, send_frame, SensorProtocol};
use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};
use pcsensor_types::{RawReading, SensorVariant};

/// 1130:660c. Commands go out as control transfers, answers come back on the interrupt
/// endpoint.
pub struct Tenx;

impl Tenx {
    pub fn decode(answer: &[u8]) -> Result<RawReading, ReadError> {
        if answer.len() < 4 {
            return Err(ReadError::ShortRead {
                expected: FRAME_LENGTH,
                received: answer.len(),
            });
        }
        Ok(RawReading(BigEndian::read_u16(&answer[2..4]) as i32))
    }
}

impl SensorProtocol for Tenx {
    const VARIANT: SensorVariant = SensorVariant::Tenx;

    fn initialise<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<(), ConnectError> {
        run_sequence(link, TENX_INIT).map_err(|(step, error)| {
            warn!("Initialisation step {:?} failed: {}", step, error);
            ConnectError::InitTransferFailed(error)
        })?;
        debug!("Tenx sensor initialised");
        Ok(())
    }

    fn read_raw<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<RawReading, ReadError> {
        if let Err(error) = send_frame(link, Frame::Temperature) {
            warn!("Temperature request failed, reading anyway: {}", error);
        }

        match read_answer(link) {
            Ok(answer) => Tenx::decode(&answer),
            Err(error) => {
                debug!("No answer from sensor: {}", error);
                Err(ReadError::ShortRead {
                    expected: FRAME_LENGTH,
                    received: 0,
                })
            }
        }
    }
}
