use pcsensor_types::Temperature;

/// A linear correction, `reading * scale + offset`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Calibration {
    pub scale: f32,
    pub offset: f32,
}

impl Calibration {
    pub const IDENTITY: Calibration = Calibration {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn apply(&self, temperature: Temperature) -> Temperature {
        Temperature(temperature.celsius() * self.scale + self.offset)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::IDENTITY
    }
}
