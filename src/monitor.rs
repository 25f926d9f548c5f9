use {
    crate::{
        geodesic,
        publish::Publisher,
        sensors::{ParticulateSensor, PositionSource},
        snapshot::{ShadowUpdate, Snapshot},
    },
    anyhow::{Context, Result},
    chrono::{DateTime, Utc},
    log::{debug, info, warn},
    rumqttc::QoS,
    std::{fs::File, io::BufWriter, io::Write, path::Path},
};

/// Most recent position and air quality reading of a single device.
///
/// Nothing here refreshes `last_update_time` on its own; call
/// [`EnvironmentalState::mark_updated`] before exporting if it should
/// reflect the latest readings.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentalState {
    pub last_update_time: DateTime<Utc>,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
    pub last_particulate_reading: Option<f64>,
    /// Gates [`EnvironmentalState::publish_snapshot`].
    pub send_remote: bool,
}

impl Default for EnvironmentalState {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentalState {
    /// Fresh state stamped with the current time, with nothing measured.
    pub fn new() -> Self {
        Self {
            last_update_time: Utc::now(),
            last_latitude: None,
            last_longitude: None,
            last_particulate_reading: None,
            send_remote: false,
        }
    }

    /// Restores the fields from a snapshot previously written by
    /// [`EnvironmentalState::export_snapshot`]. `send_remote` is not part of
    /// the snapshot and starts out false.
    pub fn import_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        Ok(Self::from(snapshot))
    }

    /// Sets `last_update_time` to now.
    pub fn mark_updated(&mut self) {
        self.last_update_time = Utc::now();
    }

    /// Distance in feet from the stored position to the given one, or zero
    /// if no position has been stored yet. Stored state is left untouched.
    pub fn calculate_distance_moved(&self, current_latitude: f64, current_longitude: f64) -> f64 {
        let (last_latitude, last_longitude) = match (self.last_latitude, self.last_longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return 0.0,
        };

        let feet = geodesic::distance_feet(
            (last_latitude, last_longitude),
            (current_latitude, current_longitude),
        );
        debug!("Moved {:.1} ft", feet);

        feet
    }

    /// Reads a position from `source` and stores it, overwriting any
    /// previous position.
    pub fn acquire_position<S: PositionSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<(f64, f64)> {
        let (latitude, longitude) = source.acquire_position()?;
        self.last_latitude = Some(latitude);
        self.last_longitude = Some(longitude);

        Ok((latitude, longitude))
    }

    pub fn acquire_particulate_reading<S: ParticulateSensor + ?Sized>(
        &mut self,
        sensor: &mut S,
    ) -> Result<f64> {
        let reading = sensor.acquire_reading()?;
        self.last_particulate_reading = Some(reading);

        Ok(reading)
    }

    /// Copies out the fields that get exported and published.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            last_update_time: self.last_update_time,
            last_longitude: self.last_longitude,
            last_latitude: self.last_latitude,
            last_particulate_reading: self.last_particulate_reading,
        }
    }

    /// Writes the snapshot as JSON to `destination`, truncating it first.
    ///
    /// The write is not atomic: a failure part way through can leave a
    /// truncated file behind. Non-finite readings are refused before the
    /// file is touched.
    pub fn export_snapshot<P: AsRef<Path>>(&self, destination: P) -> Result<()> {
        let destination = destination.as_ref();
        let context = || format!("Failed to write snapshot to {}", destination.display());

        let snapshot = self.snapshot();
        snapshot.ensure_finite().with_context(context)?;

        let file = File::create(destination).with_context(context)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &snapshot).with_context(context)?;
        writer.flush().with_context(context)?;

        info!("Saved snapshot to {}", destination.display());
        Ok(())
    }

    /// Publishes the snapshot as a device shadow update to `topic`. Does
    /// nothing unless `send_remote` is set. Non-finite readings and publish
    /// failures are returned as errors, there is no retry.
    pub fn publish_snapshot<P: Publisher + ?Sized>(
        &self,
        publisher: &mut P,
        topic: &str,
    ) -> Result<()> {
        if !self.send_remote {
            warn!("Remote sending disabled, not publishing to {}", topic);
            return Ok(());
        }

        let snapshot = self.snapshot();
        snapshot
            .ensure_finite()
            .with_context(|| format!("Refusing to publish to {}", topic))?;

        let payload = serde_json::to_vec(&ShadowUpdate::from(snapshot))?;
        publisher.publish(topic, QoS::AtLeastOnce, payload)
    }
}

impl From<Snapshot> for EnvironmentalState {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            last_update_time: snapshot.last_update_time,
            last_latitude: snapshot.last_latitude,
            last_longitude: snapshot.last_longitude,
            last_particulate_reading: snapshot.last_particulate_reading,
            send_remote: false,
        }
    }
}
