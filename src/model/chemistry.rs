//! Water chemistry readings.

/// Water chemistry readings from the status answer. `ph` and `saturation`
/// arrive on the wire as integers scaled by 100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Chemistry {
    pub ph: f64,
    pub orp: i32,
    pub saturation: f64,
    pub salt_ppm: i32,
    pub ph_tank_level: i32,
    pub orp_tank_level: i32,
    pub alarms: i32,
}
