#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("No supported temperature sensor was found")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    UsbError(#[from] rusb::Error),

    #[error("Unable to detach kernel driver from interface {interface}: {source}")]
    DriverDetachFailed { interface: u8, source: rusb::Error },

    #[error("Unable to set configuration 1: {0}")]
    ConfigurationFailed(rusb::Error),

    #[error("Unable to claim interface {interface}: {source}")]
    InterfaceClaimFailed { interface: u8, source: rusb::Error },

    #[error("Sensor rejected the initialisation request: {0}")]
    InitTransferFailed(rusb::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("Sensor is not open")]
    NotOpen,

    #[error("USB transfer error: {0}")]
    TransferError(#[from] rusb::Error),

    #[error("Short read from sensor, expected {expected} bytes, received {received}")]
    ShortRead { expected: usize, received: usize },
}
