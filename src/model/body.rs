//! A body of water (pool or spa) and its heater state.

/// A body of water. The wire value is clamped to `0` (Pool) or `1` (Spa);
/// anything else observed on the wire is treated as Pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Pool,
    Spa,
}

impl BodyType {
    /// Decode the wire `body_type` field, clamping anything above 1 to Pool.
    pub fn from_wire(raw: u32) -> Self {
        match raw {
            1 => BodyType::Spa,
            _ => BodyType::Pool,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodyType::Pool => "Pool",
            BodyType::Spa => "Spa",
        }
    }

    /// Lower-cased label used in derived sensor keys (`current_<key>_temperature`).
    pub fn key(&self) -> &'static str {
        match self {
            BodyType::Pool => "pool",
            BodyType::Spa => "spa",
        }
    }
}

/// A body of water, rebuilt in full on every status decode.
#[derive(Debug, Clone)]
pub struct Body {
    pub body_type: BodyType,
    pub current_temperature: i32,
    pub heat_status: i32,
    pub heat_set_point: i32,
    pub cool_set_point: i32,
    pub heat_mode: i32,
}
