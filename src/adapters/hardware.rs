//! Hardware adapter: bridges the real light sensor to the domain port.
//!
//! This is the only module that touches the ADC. On non-espidf targets
//! the underlying driver reads a simulation value instead.

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::sensors::light::LightSensor;
use crate::violation::RawSample;

pub struct HardwareAdapter {
    light: LightSensor,
}

impl HardwareAdapter {
    pub fn new(light: LightSensor) -> Self {
        Self { light }
    }
}

impl SensorPort for HardwareAdapter {
    fn read_light(&mut self) -> Result<RawSample, SensorError> {
        self.light.read()
    }
}
