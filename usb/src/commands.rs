// Every frame here was captured from the vendor tools, none of it is documented. The names
// carry over from the captures, Cmd1 through Cmd4 included.

pub const FRAME_LENGTH: usize = 8;

// Class requests addressed to an interface.
pub const REQUEST_SET_REPORT: u8 = 0x09;
pub const REQUEST_GET_REPORT: u8 = 0x01;

pub const INTERFACE_0: u8 = 0x00;
pub const INTERFACE_1: u8 = 0x01;
pub const CONFIGURATION: u8 = 0x01;

pub const ENDPOINT_INTERRUPT_IN: u8 = 0x82;

// Microdia data read, wValue / wIndex / length
pub const DATA_REPORT_VALUE: u16 = 0x0300;
pub const DATA_REPORT_INDEX: u16 = 0x01;
pub const DATA_REPORT_LENGTH: usize = 256;

pub type CommandFrame = [u8; FRAME_LENGTH];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Temperature,
    Ini1,
    Ini2,
    Padding,
    Cmd1,
    Cmd2,
    Cmd3,
    Cmd4,

    // Sent once, before anything else, to wake up the Tenx interface.
    Question,
}

impl Frame {
    pub const fn payload(&self) -> CommandFrame {
        match self {
            Frame::Temperature => [0x01, 0x80, 0x33, 0x01, 0x00, 0x00, 0x00, 0x00],
            Frame::Ini1 => [0x01, 0x82, 0x77, 0x01, 0x00, 0x00, 0x00, 0x00],
            Frame::Ini2 => [0x01, 0x86, 0xff, 0x01, 0x00, 0x00, 0x00, 0x00],
            Frame::Padding => [0x00; FRAME_LENGTH],
            Frame::Cmd1 => [0x0a, 0x0b, 0x0c, 0x0d, 0x00, 0x00, 0x02, 0x00],
            Frame::Cmd2 => [0x0a, 0x0b, 0x0c, 0x0d, 0x00, 0x00, 0x01, 0x00],
            Frame::Cmd3 => [0x52, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            Frame::Cmd4 => [0x54, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            Frame::Question => [0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        }
    }

    pub const fn value(&self) -> u16 {
        match self {
            Frame::Question => 0x0201,
            _ => 0x0200,
        }
    }

    pub const fn index(&self) -> u16 {
        match self {
            Frame::Question => INTERFACE_0 as u16,
            _ => INTERFACE_1 as u16,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Write(Frame),
    InterruptRead,
    DataRead,
}

/// What happens to the rest of a sequence when one of its steps fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Continue,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SequenceStep {
    pub step: Step,
    pub on_failure: OnFailure,
}

const fn abort(step: Step) -> SequenceStep {
    SequenceStep {
        step,
        on_failure: OnFailure::Abort,
    }
}

const fn tolerate(step: Step) -> SequenceStep {
    SequenceStep {
        step,
        on_failure: OnFailure::Continue,
    }
}

// The trailing data read is only there so the response can be dumped.
pub const MICRODIA_INIT: &[SequenceStep] = &[
    tolerate(Step::Write(Frame::Cmd1)),
    tolerate(Step::Write(Frame::Cmd3)),
    tolerate(Step::Write(Frame::Cmd2)),
    tolerate(Step::DataRead),
];

// Followed by a data read, which is handled separately as it carries the reading.
pub const MICRODIA_READ: &[SequenceStep] = &[
    tolerate(Step::Write(Frame::Cmd1)),
    tolerate(Step::Write(Frame::Cmd4)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Padding)),
    tolerate(Step::Write(Frame::Cmd2)),
];

// Ini2 is answered twice, so it gets two reads.
pub const TENX_INIT: &[SequenceStep] = &[
    abort(Step::Write(Frame::Question)),
    tolerate(Step::Write(Frame::Ini1)),
    tolerate(Step::InterruptRead),
    tolerate(Step::Write(Frame::Ini2)),
    tolerate(Step::InterruptRead),
    tolerate(Step::InterruptRead),
    tolerate(Step::Write(Frame::Ini1)),
    tolerate(Step::InterruptRead),
    tolerate(Step::Write(Frame::Ini1)),
    tolerate(Step::InterruptRead),
];
