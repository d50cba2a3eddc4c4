//! Owning façade: session lifecycle, cached model, time-gated refresh, and
//! the read/write surface consumed by an HTTP adapter.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::discovery;
use crate::error::BridgeError;
use crate::model::{Body, Circuit, Configuration, Device, DeviceMap, Sensor, SensorKind, SensorValue, Switch};
use crate::protocol;
use crate::session::Session;

/// Circuit id constants referenced by higher layers.
pub const CIRCUIT_SPA: i32 = 500;
pub const CIRCUIT_CLEANER: i32 = 501;
pub const CIRCUIT_SWIM_JETS: i32 = 502;
pub const CIRCUIT_POOL_LIGHT: i32 = 503;
pub const CIRCUIT_SPA_LIGHT: i32 = 504;
pub const CIRCUIT_POOL: i32 = 505;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

struct Model {
    configuration: Configuration,
    circuits: HashMap<i32, Circuit>,
    bodies: Vec<Body>,
    air_temperature: i32,
    devices: DeviceMap,
}

/// The owning façade over a gateway connection and its derived device model.
pub struct Bridge {
    addr: SocketAddr,
    timeout: Duration,
    refresh_interval: Duration,
    model: RwLock<Model>,
    last_update: RwLock<Instant>,
}

impl Bridge {
    /// Resolve the gateway endpoint (discovering it if `endpoint` is absent),
    /// load configuration and status, build derived views, and stamp the
    /// initial `last_update`.
    pub fn new(endpoint: Option<SocketAddr>, refresh_interval: Duration) -> Result<Self, BridgeError> {
        if refresh_interval.is_zero() {
            return Err(BridgeError::Config("refresh interval must be positive".into()));
        }

        let addr = match endpoint {
            Some(addr) => addr,
            None => {
                let info = discovery::discover(DEFAULT_DISCOVERY_TIMEOUT)?;
                info.addr().ok_or_else(|| {
                    BridgeError::Config(format!("discovered gateway has an unparseable address: {}:{}", info.ip, info.port))
                })?
            }
        };

        let timeout = DEFAULT_CALL_TIMEOUT;
        let mut session = Session::new(addr);
        session.connect(timeout)?;

        let config_answer = protocol::query_config(&mut session, timeout)?;
        let status_answer = protocol::query_status(&mut session, timeout)?;
        session.close();

        let mut circuits: HashMap<i32, Circuit> = config_answer
            .circuits
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        apply_circuit_states(&mut circuits, &status_answer.circuit_states);

        let mut model = Model {
            configuration: config_answer.configuration,
            circuits,
            bodies: status_answer.bodies,
            air_temperature: status_answer.air_temperature,
            devices: DeviceMap::new(),
        };
        rebuild_devices(&mut model, &status_answer.chemistry);

        info!(%addr, "bridge initialized");
        Ok(Self {
            addr,
            timeout,
            refresh_interval,
            model: RwLock::new(model),
            last_update: RwLock::new(Instant::now()),
        })
    }

    /// Re-query status if the refresh interval has elapsed since the last
    /// successful update. A failure leaves the cached model untouched and
    /// does not advance `last_update`.
    pub fn refresh(&self) -> Result<(), BridgeError> {
        {
            let last_update = *self.last_update.read().unwrap();
            if last_update.elapsed() < self.refresh_interval {
                return Ok(());
            }
        }

        let mut model = self.model.write().unwrap();
        let last_update = *self.last_update.read().unwrap();
        if last_update.elapsed() < self.refresh_interval {
            return Ok(());
        }

        let mut session = Session::new(self.addr);
        session.connect(self.timeout)?;
        let status_answer = protocol::query_status(&mut session, self.timeout)?;
        session.close();

        apply_circuit_states(&mut model.circuits, &status_answer.circuit_states);
        model.bodies = status_answer.bodies;
        model.air_temperature = status_answer.air_temperature;
        rebuild_devices(&mut model, &status_answer.chemistry);
        *self.last_update.write().unwrap() = Instant::now();
        Ok(())
    }

    /// Send a button-press for `circuit_id`, then immediately re-query status
    /// and rebuild derived views. On any failure the model is left
    /// unmutated.
    pub fn set_circuit(&self, circuit_id: i32, state: i32) -> Result<(), BridgeError> {
        let mut model = self.model.write().unwrap();

        let mut session = Session::new(self.addr);
        session.connect(self.timeout)?;
        protocol::set_circuit(&mut session, circuit_id, state, self.timeout)?;
        let status_answer = protocol::query_status(&mut session, self.timeout)?;
        session.close();

        apply_circuit_states(&mut model.circuits, &status_answer.circuit_states);
        model.bodies = status_answer.bodies;
        model.air_temperature = status_answer.air_temperature;
        rebuild_devices(&mut model, &status_answer.chemistry);
        *self.last_update.write().unwrap() = Instant::now();
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn get_json(&self) -> serde_json::Value {
        let model = self.model.read().unwrap();
        let mut out = serde_json::Map::with_capacity(model.devices.len());
        for (key, device) in &model.devices {
            out.insert(key.clone(), device.to_json());
        }
        serde_json::Value::Object(out)
    }

    #[cfg(feature = "serde")]
    pub fn get_attribute(&self, key: &str) -> Result<serde_json::Value, BridgeError> {
        let model = self.model.read().unwrap();
        model
            .devices
            .get(key)
            .map(Device::to_json)
            .ok_or_else(|| BridgeError::NotFound(key.to_string()))
    }

    /// Returns the catalog's raw `state` for `circuit_id`, or `None` if the
    /// id is absent from the catalog.
    pub fn get_circuit_state(&self, circuit_id: i32) -> Option<i32> {
        let model = self.model.read().unwrap();
        model.circuits.get(&circuit_id).map(|c| c.state)
    }

    /// Returns the current temperature for body index `i` (0 = pool, 1 =
    /// spa as reported by the status answer's body ordering).
    pub fn get_body_temperature(&self, index: usize) -> Option<i32> {
        let model = self.model.read().unwrap();
        model.bodies.get(index).map(|b| b.current_temperature)
    }

    pub fn is_spa_on(&self) -> bool {
        self.get_circuit_state(CIRCUIT_SPA).unwrap_or(0) > 0
    }

    pub fn temperature_unit(&self) -> &'static str {
        let model = self.model.read().unwrap();
        let unit = model.configuration.temperature_unit();
        // unit is 'static regardless of the lock's lifetime
        unit
    }
}

fn apply_circuit_states(circuits: &mut HashMap<i32, Circuit>, states: &[(i32, i32)]) {
    for (id, state) in states {
        if let Some(circuit) = circuits.get_mut(id) {
            circuit.state = *state;
        } else {
            warn!(circuit_id = id, "status referenced unknown circuit, ignoring");
        }
    }
}

fn rebuild_devices(model: &mut Model, chemistry: &crate::model::Chemistry) {
    for circuit in model.circuits.values() {
        model.devices.insert(
            circuit.key(),
            Device::Switch(Switch {
                id: circuit.id,
                name: circuit.name.clone(),
                state: circuit.state,
            }),
        );
    }

    let unit = model.configuration.temperature_unit();

    model.devices.insert(
        "air_temperature".into(),
        Device::Sensor(Sensor {
            key: "air_temperature".into(),
            display_name: "Air Temperature".into(),
            value: SensorValue::Int(model.air_temperature as i64),
            unit: unit.to_string(),
            kind: SensorKind::Sensor,
        }),
    );

    for (i, body) in model.bodies.iter().enumerate() {
        let body_name = body.body_type.label();
        let body_key = body.body_type.key();

        let temp_key = format!("current_{body_key}_temperature");
        model.devices.insert(
            temp_key.clone(),
            Device::Sensor(Sensor {
                key: temp_key,
                display_name: format!("Current {body_name} Temperature"),
                value: SensorValue::Int(body.current_temperature as i64),
                unit: unit.to_string(),
                kind: SensorKind::Sensor,
            }),
        );

        let heat_key = format!("{body_key}_heater_{i}");
        model.devices.insert(
            heat_key.clone(),
            Device::Sensor(Sensor {
                key: heat_key,
                display_name: format!("{body_name} Heater"),
                value: SensorValue::Int(body.heat_status as i64),
                unit: String::new(),
                kind: SensorKind::BinarySensor,
            }),
        );
    }

    model.devices.insert(
        "ph".into(),
        Device::Sensor(Sensor {
            key: "ph".into(),
            display_name: "pH".into(),
            value: SensorValue::Float(chemistry.ph),
            unit: String::new(),
            kind: SensorKind::Sensor,
        }),
    );
    model.devices.insert(
        "orp".into(),
        Device::Sensor(Sensor {
            key: "orp".into(),
            display_name: "ORP".into(),
            value: SensorValue::Int(chemistry.orp as i64),
            unit: String::new(),
            kind: SensorKind::Sensor,
        }),
    );
    model.devices.insert(
        "saturation".into(),
        Device::Sensor(Sensor {
            key: "saturation".into(),
            display_name: "Saturation Index".into(),
            value: SensorValue::Float(chemistry.saturation),
            unit: String::new(),
            kind: SensorKind::Sensor,
        }),
    );
    model.devices.insert(
        "salt_ppm".into(),
        Device::Sensor(Sensor {
            key: "salt_ppm".into(),
            display_name: "Salt".into(),
            value: SensorValue::Int(chemistry.salt_ppm as i64),
            unit: "ppm".into(),
            kind: SensorKind::Sensor,
        }),
    );
}
