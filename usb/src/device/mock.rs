use crate::device::base::{UsbBus, UsbDeviceIo};
use pcsensor_types::UsbId;
use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Open(usize),
    DetachKernelDriver(u8),
    SetConfiguration(u8),
    Claim(u8),
    Release(u8),
    WriteControl {
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: Vec<u8>,
    },
    ReadControl {
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        length: usize,
    },
    ReadInterrupt {
        endpoint: u8,
        length: usize,
    },
}

// Scripted device behaviour. Queued responses are used first, then the fallback.
pub struct MockState {
    pub devices: Vec<UsbId>,
    pub calls: Vec<Call>,

    pub fail_open: bool,
    pub kernel_driver: [bool; 2],
    pub fail_detach: bool,
    pub fail_configuration: bool,
    pub fail_claim: Option<u8>,
    pub fail_release: bool,

    pub fail_write_values: Vec<u16>,
    pub control_responses: VecDeque<rusb::Result<Vec<u8>>>,
    pub control_fallback: rusb::Result<Vec<u8>>,
    pub interrupt_responses: VecDeque<rusb::Result<Vec<u8>>>,
    pub interrupt_fallback: rusb::Result<Vec<u8>>,
}

#[derive(Clone)]
pub struct MockBus {
    state: Rc<RefCell<MockState>>,
}

impl MockBus {
    pub fn new(devices: &[UsbId]) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                devices: devices.to_vec(),
                calls: Vec::new(),
                fail_open: false,
                kernel_driver: [false, false],
                fail_detach: false,
                fail_configuration: false,
                fail_claim: None,
                fail_release: false,
                fail_write_values: Vec::new(),
                control_responses: VecDeque::new(),
                control_fallback: Ok(Vec::new()),
                interrupt_responses: VecDeque::new(),
                interrupt_fallback: Ok(vec![0; 8]),
            })),
        }
    }

    pub fn state(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Payloads of every control write so far, in order.
    pub fn written_frames(&self) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::WriteControl { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }
}

impl UsbBus for MockBus {
    type Device = usize;
    type Handle = MockHandle;

    fn devices(&self) -> rusb::Result<Vec<(usize, UsbId)>> {
        Ok(self.state.borrow().devices.iter().copied().enumerate().collect())
    }

    fn open(&self, device: &usize) -> rusb::Result<MockHandle> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Open(*device));
        if state.fail_open {
            return Err(rusb::Error::Access);
        }
        Ok(MockHandle {
            state: self.state.clone(),
        })
    }
}

pub struct MockHandle {
    state: Rc<RefCell<MockState>>,
}

impl UsbDeviceIo for MockHandle {
    fn kernel_driver_active(&self, interface: u8) -> rusb::Result<bool> {
        Ok(self.state.borrow().kernel_driver[interface as usize])
    }

    fn detach_kernel_driver(&mut self, interface: u8) -> rusb::Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DetachKernelDriver(interface));
        if state.fail_detach {
            return Err(rusb::Error::Busy);
        }
        state.kernel_driver[interface as usize] = false;
        Ok(())
    }

    fn set_active_configuration(&mut self, config: u8) -> rusb::Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::SetConfiguration(config));
        match state.fail_configuration {
            true => Err(rusb::Error::Busy),
            false => Ok(()),
        }
    }

    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Claim(interface));
        match state.fail_claim == Some(interface) {
            true => Err(rusb::Error::Busy),
            false => Ok(()),
        }
    }

    fn release_interface(&mut self, interface: u8) -> rusb::Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Release(interface));
        match state.fail_release {
            true => Err(rusb::Error::NoDevice),
            false => Ok(()),
        }
    }

    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        _timeout: Duration,
    ) -> rusb::Result<usize> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::WriteControl {
            request_type,
            request,
            value,
            index,
            data: data.to_vec(),
        });
        match state.fail_write_values.contains(&value) {
            true => Err(rusb::Error::Pipe),
            false => Ok(data.len()),
        }
    }

    fn read_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> rusb::Result<usize> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ReadControl {
            request_type,
            request,
            value,
            index,
            length: buf.len(),
        });
        let response = match state.control_responses.pop_front() {
            Some(response) => response,
            None => state.control_fallback.clone(),
        }?;
        Ok(fill(buf, &response))
    }

    fn read_interrupt(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> rusb::Result<usize> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ReadInterrupt {
            endpoint,
            length: buf.len(),
        });
        let response = match state.interrupt_responses.pop_front() {
            Some(response) => response,
            None => state.interrupt_fallback.clone(),
        }?;
        Ok(fill(buf, &response))
    }
}

fn fill(buf: &mut [u8], response: &[u8]) -> usize {
    let length = response.len().min(buf.len());
    buf[..length].copy_from_slice(&response[..length]);
    length
}
