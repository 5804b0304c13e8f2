use crate::commands::{
    Frame, OnFailure, SequenceStep, Step, DATA_REPORT_INDEX, DATA_REPORT_LENGTH,
    DATA_REPORT_VALUE, ENDPOINT_INTERRUPT_IN, FRAME_LENGTH, REQUEST_GET_REPORT,
    REQUEST_SET_REPORT,
};
use crate::device::base::{UsbDeviceIo, UsbLink};
use crate::error::{ConnectError, ReadError};
use log::{debug, warn};
use pcsensor_types::{RawReading, SensorVariant};
use std::marker::PhantomData;

mod microdia;
mod tenx;

pub use microdia::Microdia;
pub use tenx::Tenx;

/// The command set for one sensor variant.
pub trait SensorProtocol {
    const VARIANT: SensorVariant;

    /// Brings a freshly claimed device into a state where it can be read.
    fn initialise<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<(), ConnectError>;

    fn read_raw<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<RawReading, ReadError>;
}

// An initialised device, with its protocol fixed for the rest of its life.
pub(crate) trait ActiveSensor {
    fn variant(&self) -> SensorVariant;
    fn read_raw(&mut self) -> Result<RawReading, ReadError>;
    fn close(self: Box<Self>);
}

struct Attached<P: SensorProtocol, H: UsbDeviceIo> {
    link: UsbLink<H>,
    protocol: PhantomData<P>,
}

impl<P: SensorProtocol, H: UsbDeviceIo> ActiveSensor for Attached<P, H> {
    fn variant(&self) -> SensorVariant {
        P::VARIANT
    }

    fn read_raw(&mut self) -> Result<RawReading, ReadError> {
        P::read_raw(&mut self.link)
    }

    fn close(self: Box<Self>) {
        self.link.close();
    }
}

fn attach<P, H>(mut link: UsbLink<H>) -> Result<Box<dyn ActiveSensor>, ConnectError>
where
    P: SensorProtocol + 'static,
    H: UsbDeviceIo + 'static,
{
    // On failure the link is dropped here, which releases the interfaces.
    P::initialise(&mut link)?;
    Ok(Box::new(Attached::<P, H> {
        link,
        protocol: PhantomData,
    }))
}

pub(crate) fn attach_variant<H: UsbDeviceIo + 'static>(
    variant: SensorVariant,
    link: UsbLink<H>,
) -> Result<Box<dyn ActiveSensor>, ConnectError> {
    match variant {
        SensorVariant::Microdia => attach::<Microdia, H>(link),
        SensorVariant::Tenx => attach::<Tenx, H>(link),
    }
}

pub(crate) fn send_frame<H: UsbDeviceIo>(
    link: &mut UsbLink<H>,
    frame: Frame,
) -> Result<(), rusb::Error> {
    let payload = frame.payload();
    link.write_class_control(REQUEST_SET_REPORT, frame.value(), frame.index(), &payload)?;
    debug!("{:?} -> {:02x?}", frame, payload);
    Ok(())
}

pub(crate) fn read_answer<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<Vec<u8>, rusb::Error> {
    let answer = link.read_interrupt(ENDPOINT_INTERRUPT_IN, FRAME_LENGTH)?;
    debug!("Interrupt <- {:02x?}", answer);
    Ok(answer)
}

pub(crate) fn read_data<H: UsbDeviceIo>(link: &mut UsbLink<H>) -> Result<Vec<u8>, rusb::Error> {
    let data = link.read_class_control(
        REQUEST_GET_REPORT,
        DATA_REPORT_VALUE,
        DATA_REPORT_INDEX,
        DATA_REPORT_LENGTH,
    )?;
    debug!("Data ({} bytes) <- {:02x?}", data.len(), data);
    Ok(data)
}

/// Runs a sequence, logging and skipping past steps that are allowed to fail. Returns the
/// first step that failed with an `Abort` policy.
pub(crate) fn run_sequence<H: UsbDeviceIo>(
    link: &mut UsbLink<H>,
    sequence: &[SequenceStep],
) -> Result<(), (Step, rusb::Error)> {
    for entry in sequence {
        let result = match entry.step {
            Step::Write(frame) => send_frame(link, frame),
            Step::InterruptRead => read_answer(link).map(|_| ()),
            Step::DataRead => read_data(link).map(|_| ()),
        };

        if let Err(error) = result {
            match entry.on_failure {
                OnFailure::Abort => return Err((entry.step, error)),
                OnFailure::Continue => warn!("{:?} failed, continuing: {}", entry.step, error),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{MICRODIA_INIT, TENX_INIT};
    use crate::device::mock::{Call, MockBus};

    fn open_link(bus: &MockBus) -> UsbLink<crate::device::mock::MockHandle> {
        let link = UsbLink::open(bus, &0).unwrap();
        bus.clear_calls();
        link
    }

    #[test]
    fn tolerated_failures_do_not_stop_the_sequence() {
        let bus = MockBus::new(&[SensorVariant::Microdia.usb_id()]);
        bus.state().fail_write_values = vec![0x0200];
        bus.state().control_fallback = Err(rusb::Error::Timeout);
        let mut link = open_link(&bus);

        assert!(run_sequence(&mut link, MICRODIA_INIT).is_ok());
        assert_eq!(bus.calls().len(), MICRODIA_INIT.len());
    }

    #[test]
    fn abort_stops_at_the_failing_step() {
        let bus = MockBus::new(&[SensorVariant::Tenx.usb_id()]);
        bus.state().fail_write_values = vec![0x0201];
        let mut link = open_link(&bus);

        let result = run_sequence(&mut link, TENX_INIT);
        assert_eq!(
            result,
            Err((Step::Write(Frame::Question), rusb::Error::Pipe))
        );
        assert_eq!(bus.calls().len(), 1);
    }

    #[test]
    fn failed_initialisation_releases_interfaces() {
        let bus = MockBus::new(&[SensorVariant::Tenx.usb_id()]);
        bus.state().fail_write_values = vec![0x0201];
        let link = open_link(&bus);

        let result = attach_variant(SensorVariant::Tenx, link);
        assert!(matches!(result, Err(ConnectError::InitTransferFailed(_))));
        assert!(bus.calls().ends_with(&[Call::Release(1), Call::Release(0)]));
    }

    #[test]
    fn attached_sensor_reports_its_variant() {
        let bus = MockBus::new(&[SensorVariant::Microdia.usb_id()]);
        let link = open_link(&bus);

        let active = attach_variant(SensorVariant::Microdia, link).unwrap();
        assert_eq!(active.variant(), SensorVariant::Microdia);
        active.close();
        assert!(bus.calls().ends_with(&[Call::Release(1), Call::Release(0)]));
    }
}
