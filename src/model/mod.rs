//! The canonical in-memory pool device model.
//!
//! [`Configuration`] and the circuit catalog are built once from the
//! configuration answer and never rebuilt; circuit `state` fields and the
//! derived [`device::DeviceMap`] are refreshed on every status answer.

pub mod body;
pub mod chemistry;
pub mod color;
pub mod device;

use std::collections::HashMap;

pub use body::{Body, BodyType};
pub use chemistry::Chemistry;
pub use color::Color;
pub use device::{Device, DeviceMap, PoolDevice, Sensor, SensorKind, SensorValue, Switch};

/// Controller-wide configuration: loaded once at bridge start and treated
/// as immutable afterward (a refresh never re-reads it).
#[derive(Debug, Clone)]
pub struct Configuration {
    pub controller_id: u32,
    pub min_set_point: [u8; 2],
    pub max_set_point: [u8; 2],
    pub is_celsius: bool,
    pub controller_type: u8,
    pub hardware_type: u8,
    pub equipment_flags: i32,
    pub circuit_count: u32,
    pub colors: Vec<Color>,
    /// Pump data for slots 0..7.
    pub pumps: HashMap<u8, u8>,
    pub interface_tab_flags: u32,
    pub show_alarms: u32,
}

impl Configuration {
    pub fn temperature_unit(&self) -> &'static str {
        if self.is_celsius {
            "°C"
        } else {
            "°F"
        }
    }
}

/// A named, toggleable output on the controller. Populated by the
/// configuration answer; `state` is the only field the status answer
/// overwrites.
#[derive(Debug, Clone)]
pub struct Circuit {
    pub id: i32,
    pub name: String,
    pub function: u8,
    pub interface: u8,
    pub flags: u8,
    pub color_set: u8,
    pub color_position: u8,
    pub color_stagger: u8,
    pub device_id: u8,
    pub default_runtime: u16,
    /// 0 (off) or any positive value (on).
    pub state: i32,
}

impl Circuit {
    pub fn is_on(&self) -> bool {
        self.state > 0
    }

    /// Stable switch key: the circuit name, lower-cased, spaces as underscores.
    pub fn key(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }
}
