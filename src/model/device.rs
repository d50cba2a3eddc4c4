//! Read-facing device views: switches, sensors, and the keyed map of both.
//!
//! The canonical storage is the tagged-sum [`Device`] rather than a shared
//! abstract base, so the projection logic stays exhaustive and total. The
//! [`PoolDevice`] trait exists alongside it purely to give callers a single
//! read-only surface (name, hass type, friendly state) when they don't care
//! which variant they hold — the gateway's own device abstraction has one
//! too.

use std::collections::HashMap;

/// An open-ended sensor reading. The gateway treats sensor state as
/// dynamically typed; this tagged sum carries that through to Rust instead
/// of flattening everything to a string.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SensorValue {
    Int(i64),
    Float(f64),
    String(String),
}

impl SensorValue {
    fn is_positive(&self) -> bool {
        match self {
            SensorValue::Int(v) => *v > 0,
            SensorValue::Float(v) => *v > 0.0,
            SensorValue::String(_) => false,
        }
    }

    fn render(&self) -> String {
        match self {
            SensorValue::Int(v) => v.to_string(),
            SensorValue::Float(v) => {
                // Trim to a couple of decimal places; chemistry readings
                // (pH, saturation index) are the only floats in practice.
                let rounded = (*v * 100.0).round() / 100.0;
                if rounded.fract() == 0.0 {
                    format!("{rounded:.0}")
                } else {
                    format!("{rounded}")
                }
            }
            SensorValue::String(s) => s.clone(),
        }
    }
}

/// What kind of Home-Assistant-style entity a [`Sensor`] renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Sensor,
    BinarySensor,
}

impl SensorKind {
    pub fn hass_type(&self) -> &'static str {
        match self {
            SensorKind::Sensor => "sensor",
            SensorKind::BinarySensor => "binary_sensor",
        }
    }
}

/// A derived, read-only sensor view (chemistry reading, temperature,
/// heater status, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub key: String,
    pub display_name: String,
    pub value: SensorValue,
    pub unit: String,
    pub kind: SensorKind,
}

impl Sensor {
    /// "On"/"Off" for binary sensors by `value > 0`; otherwise `value unit`
    /// with no trailing space when the unit is empty.
    pub fn friendly_state(&self) -> String {
        match self.kind {
            SensorKind::BinarySensor => {
                if self.value.is_positive() {
                    "On".to_string()
                } else {
                    "Off".to_string()
                }
            }
            SensorKind::Sensor => {
                let rendered = self.value.render();
                if self.unit.is_empty() {
                    rendered
                } else {
                    format!("{rendered} {}", self.unit)
                }
            }
        }
    }
}

/// A derived, read-only switch view over a catalog [`super::Circuit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub id: i32,
    pub name: String,
    pub state: i32,
}

impl Switch {
    /// "On" iff `state > 0`, else "Off".
    pub fn friendly_state(&self) -> &'static str {
        if self.state > 0 {
            "On"
        } else {
            "Off"
        }
    }
}

/// The uniform read-only surface shared by [`Switch`] and [`Sensor`].
pub trait PoolDevice {
    fn hass_type(&self) -> &'static str;
    fn friendly_state_string(&self) -> String;
}

impl PoolDevice for Switch {
    fn hass_type(&self) -> &'static str {
        "switch"
    }

    fn friendly_state_string(&self) -> String {
        self.friendly_state().to_string()
    }
}

impl PoolDevice for Sensor {
    fn hass_type(&self) -> &'static str {
        self.kind.hass_type()
    }

    fn friendly_state_string(&self) -> String {
        self.friendly_state()
    }
}

/// A device stored in the [`DeviceMap`] under a stable key: either a
/// circuit-backed switch or a derived sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum Device {
    Switch(Switch),
    Sensor(Sensor),
}

impl Device {
    pub fn friendly_state(&self) -> String {
        match self {
            Device::Switch(s) => s.friendly_state().to_string(),
            Device::Sensor(s) => s.friendly_state(),
        }
    }

    pub fn hass_type(&self) -> &'static str {
        match self {
            Device::Switch(s) => s.hass_type(),
            Device::Sensor(s) => s.hass_type(),
        }
    }
}

/// Keyed by stable strings: lower-cased, space-to-underscore circuit names
/// for switches, or a fixed naming scheme for sensors. Keys are unique; on
/// collision the last write wins.
pub type DeviceMap = HashMap<String, Device>;

#[cfg(feature = "serde")]
impl Device {
    /// The JSON projection consumed by the HTTP adapter: a switch serializes
    /// as `{id, name, friendlyState, state}`, a sensor as `{name, state}`
    /// with `state` the rendered friendly string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Device::Switch(s) => serde_json::json!({
                "id": s.id,
                "name": s.name,
                "friendlyState": if s.state > 0 { "on" } else { "off" },
                "state": if s.state > 0 { 1 } else { 0 },
            }),
            Device::Sensor(s) => serde_json::json!({
                "name": s.display_name,
                "state": s.friendly_state(),
            }),
        }
    }
}
