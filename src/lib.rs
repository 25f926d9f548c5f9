use {
    crate::{
        config::Config,
        monitor::EnvironmentalState,
        publish::MqttPublisher,
        sensors::{FixedParticulate, FixedPosition, ParticulateSensor, PositionSource},
    },
    anyhow::Result,
    log::{info, warn},
};

pub mod config;
pub mod geodesic;
pub mod monitor;
pub mod publish;
pub mod sensors;
pub mod snapshot;

/// Runs one monitoring cycle on the device: sample, save, publish.
pub fn run() -> Result<()> {
    pretty_env_logger::init();
    color_backtrace::install();

    let config = Config::from_env()?;

    let mut state = if config.snapshot_path.exists() {
        match EnvironmentalState::import_snapshot(&config.snapshot_path) {
            Ok(state) => state,
            Err(e) => {
                warn!("{:#}", e);
                EnvironmentalState::new()
            }
        }
    } else {
        EnvironmentalState::new()
    };
    state.send_remote = config.send_remote;

    let mut gps = FixedPosition::initialize()?;
    let mut particulate = FixedParticulate::initialize()?;

    let moved = sample(&mut state, &mut gps, &mut particulate)?;
    info!("Moved {:.1} ft since last update", moved);

    state.export_snapshot(&config.snapshot_path)?;

    if let Some(mqtt) = &config.mqtt {
        let mut publisher = MqttPublisher::connect(mqtt)?;
        state.publish_snapshot(&mut publisher, &mqtt.topic)?;
    }

    Ok(())
}

/// Takes a fresh position and particulate reading, stamps the state, and
/// returns the distance moved in feet from the previously stored position.
pub fn sample<G, S>(state: &mut EnvironmentalState, gps: &mut G, sensor: &mut S) -> Result<f64>
where
    G: PositionSource + ?Sized,
    S: ParticulateSensor + ?Sized,
{
    let previous = state.clone();
    let (latitude, longitude) = state.acquire_position(gps)?;
    let moved = previous.calculate_distance_moved(latitude, longitude);

    state.acquire_particulate_reading(sensor)?;
    state.mark_updated();

    Ok(moved)
}
