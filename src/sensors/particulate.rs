use {crate::sensors::ParticulateSensor, anyhow::Result, log::debug};

const READING: f64 = 15.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedParticulate {
    pub reading: f64,
}

impl Default for FixedParticulate {
    fn default() -> Self {
        Self { reading: READING }
    }
}

impl ParticulateSensor for FixedParticulate {
    fn initialize() -> Result<Self> {
        Ok(Self::default())
    }

    fn acquire_reading(&mut self) -> Result<f64> {
        debug!("Particulate reading {}", self.reading);
        Ok(self.reading)
    }
}
