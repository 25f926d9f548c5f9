use {
    crate::config::MqttConfig,
    anyhow::{anyhow, Context, Result},
    log::{info, trace},
    rumqttc::{Client, Connection, Event, MqttOptions, Outgoing, Packet, QoS, Transport},
    std::{fs, path::Path},
};

/// Capacity of the request channel between the client and its event loop.
const REQUEST_CAPACITY: usize = 10;

/// Sink for messages leaving the device.
pub trait Publisher {
    /// Publishes `payload` to `topic`, returning once the transport has
    /// handed it off at the requested quality of service.
    fn publish(&mut self, topic: &str, qos: QoS, payload: Vec<u8>) -> Result<()>;
}

/// Blocking MQTT publisher.
///
/// The connection is driven from [`Publisher::publish`] itself, so nothing
/// goes over the wire between calls.
pub struct MqttPublisher {
    client: Client,
    connection: Connection,
}

impl MqttPublisher {
    pub fn connect(config: &MqttConfig) -> Result<Self> {
        info!("MQTT connecting to {}:{}", config.address, config.port);

        let mut options = MqttOptions::new(&config.client_id, &config.address, config.port);
        options.set_keep_alive(config.keep_alive);

        if let Some(tls) = &config.tls {
            let read = |path: &Path| {
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
            };
            let ca = read(tls.ca.as_path())?;
            let cert = read(tls.cert.as_path())?;
            let key = read(tls.key.as_path())?;

            options.set_transport(Transport::tls(ca, Some((cert, key)), None));
        }

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);

        Ok(Self { client, connection })
    }
}

impl Publisher for MqttPublisher {
    fn publish(&mut self, topic: &str, qos: QoS, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, qos, false, payload)
            .with_context(|| format!("Failed to queue publish to {}", topic))?;

        let mut delivery = Delivery::new(qos);
        for notification in self.connection.iter() {
            let event = notification.with_context(|| format!("Failed to publish to {}", topic))?;

            if delivery.complete(&event) {
                info!("Published to {}", topic);
                return Ok(());
            }
            trace!("{:?}", event);
        }

        Err(anyhow!(
            "MQTT connection closed before publish to {} completed",
            topic
        ))
    }
}

/// Follows one publish through the event loop, matching acknowledgements
/// against the packet id it went out with.
struct Delivery {
    qos: QoS,
    pkid: Option<u16>,
}

impl Delivery {
    fn new(qos: QoS) -> Self {
        Self { qos, pkid: None }
    }

    fn complete(&mut self, event: &Event) -> bool {
        match (self.qos, event) {
            (_, Event::Outgoing(Outgoing::Publish(pkid))) if self.pkid.is_none() => {
                self.pkid = Some(*pkid);
                self.qos == QoS::AtMostOnce
            }
            (QoS::AtLeastOnce, Event::Incoming(Packet::PubAck(ack))) => {
                self.pkid == Some(ack.pkid)
            }
            (QoS::ExactlyOnce, Event::Incoming(Packet::PubComp(comp))) => {
                self.pkid == Some(comp.pkid)
            }
            _ => false,
        }
    }
}
