//! Runtime configuration, read from environment variables.

use {
    anyhow::{anyhow, Context, Result},
    std::{env, path::PathBuf, time::Duration},
};

const DEFAULT_SNAPSHOT_PATH: &str = "environment.json";
const DEFAULT_MQTT_PORT: u16 = 8883;
const DEFAULT_KEEP_ALIVE_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub send_remote: bool,
    /// Present only when `send_remote` is set.
    pub mqtt: Option<MqttConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MqttConfig {
    pub client_id: String,
    pub address: String,
    pub port: u16,
    pub topic: String,
    pub keep_alive: Duration,
    pub tls: Option<TlsFiles>,
}

/// PEM files for mutual TLS.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsFiles {
    pub ca: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string())
            .into();

        let send_remote = match lookup("SEND_REMOTE") {
            Some(value) => parse_bool(&value).context("Invalid SEND_REMOTE")?,
            None => false,
        };

        let mqtt = if send_remote {
            Some(MqttConfig::from_lookup(&lookup)?)
        } else {
            None
        };

        Ok(Self {
            snapshot_path,
            send_remote,
            mqtt,
        })
    }
}

impl MqttConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| anyhow!("Failed to find {} environment variable", name))
        };

        let client_id = lookup("DEVICE_ID")
            .or_else(|| lookup("BALENA_DEVICE_UUID"))
            .ok_or_else(|| anyhow!("Failed to find DEVICE_ID environment variable"))?;
        let address = required("MQTT_ADDR")?;
        let topic = required("MQTT_TOPIC")?;

        let port = match lookup("MQTT_PORT") {
            Some(port) => port.parse().context("Invalid MQTT_PORT")?,
            None => DEFAULT_MQTT_PORT,
        };

        let keep_alive = match lookup("MQTT_KEEP_ALIVE_SECS") {
            Some(secs) => secs.parse().context("Invalid MQTT_KEEP_ALIVE_SECS")?,
            None => DEFAULT_KEEP_ALIVE_SECS,
        };

        let tls = match (lookup("MQTT_CA"), lookup("MQTT_CERT"), lookup("MQTT_KEY")) {
            (Some(ca), Some(cert), Some(key)) => Some(TlsFiles {
                ca: ca.into(),
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None, None) => None,
            _ => {
                return Err(anyhow!(
                    "MQTT_CA, MQTT_CERT and MQTT_KEY must be set together"
                ))
            }
        };

        Ok(Self {
            client_id,
            address,
            port,
            topic,
            keep_alive: Duration::from_secs(keep_alive),
            tls,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("Expected a boolean, got {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashMap};

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_local_only() {
        let config = load(&[]).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("environment.json"));
        assert!(!config.send_remote);
        assert!(config.mqtt.is_none());
    }

    #[test]
    fn broker_settings_ignored_when_not_sending() {
        let config = load(&[("SEND_REMOTE", "false"), ("MQTT_PORT", "not a port")]).unwrap();
        assert!(config.mqtt.is_none());
    }

    #[test]
    fn remote_requires_broker() {
        let err = load(&[("SEND_REMOTE", "true"), ("DEVICE_ID", "dev")]).unwrap_err();
        assert!(err.to_string().contains("MQTT_ADDR"));
    }

    #[test]
    fn remote_with_tls() {
        let config = load(&[
            ("SEND_REMOTE", "yes"),
            ("BALENA_DEVICE_UUID", "abc123"),
            ("MQTT_ADDR", "example-ats.iot.us-east-1.amazonaws.com"),
            ("MQTT_TOPIC", "$aws/things/abc123/shadow/update"),
            ("MQTT_CA", "/certs/root.pem"),
            ("MQTT_CERT", "/certs/device.pem"),
            ("MQTT_KEY", "/certs/device.key"),
        ])
        .unwrap();

        let mqtt = config.mqtt.unwrap();
        assert_eq!(mqtt.client_id, "abc123");
        assert_eq!(mqtt.port, 8883);
        assert_eq!(mqtt.keep_alive, Duration::from_secs(5));
        assert_eq!(mqtt.tls.unwrap().key, PathBuf::from("/certs/device.key"));
    }

    #[test]
    fn partial_tls_is_an_error() {
        let result = load(&[
            ("SEND_REMOTE", "1"),
            ("DEVICE_ID", "dev"),
            ("MQTT_ADDR", "localhost"),
            ("MQTT_TOPIC", "env"),
            ("MQTT_CA", "/certs/root.pem"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_garbage_flag() {
        assert!(load(&[("SEND_REMOTE", "maybe")]).is_err());
    }
}
