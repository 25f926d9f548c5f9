use {crate::sensors::PositionSource, anyhow::Result, log::debug};

/// Downtown Los Angeles, reported until a GPS module is wired up.
const LATITUDE: f64 = 34.0522;
const LONGITUDE: f64 = -118.2437;

/// Position source that always reports the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for FixedPosition {
    fn default() -> Self {
        Self {
            latitude: LATITUDE,
            longitude: LONGITUDE,
        }
    }
}

impl PositionSource for FixedPosition {
    fn initialize() -> Result<Self> {
        Ok(Self::default())
    }

    fn acquire_position(&mut self) -> Result<(f64, f64)> {
        debug!("GPS fix {}, {}", self.latitude, self.longitude);
        Ok((self.latitude, self.longitude))
    }
}
