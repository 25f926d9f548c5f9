use anyhow::Result;

mod gps;
mod particulate;

pub use {gps::FixedPosition, particulate::FixedParticulate};

/// Something that can report where the device currently is.
pub trait PositionSource {
    fn initialize() -> Result<Self>
    where
        Self: Sized;

    /// Returns `(latitude, longitude)` in degrees.
    fn acquire_position(&mut self) -> Result<(f64, f64)>;
}

pub trait ParticulateSensor {
    fn initialize() -> Result<Self>
    where
        Self: Sized;

    fn acquire_reading(&mut self) -> Result<f64>;
}
