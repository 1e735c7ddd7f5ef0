//! Live data shapes, as the renderer consumes them.

use std::fmt;

use chrono::{DateTime, Utc};

/// Outcome of a live query.
///
/// `Empty` means the provider answered with nothing to show; `Unavailable`
/// means it could not be asked (timeout, rate limit, error document).
#[derive(Debug, Clone, PartialEq)]
pub enum Live<T> {
    Data(T),
    Empty,
    Unavailable,
}

impl<T> Live<T> {
    pub fn is_available(&self) -> bool {
        !matches!(self, Live::Unavailable)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Live::Data(t) => Some(t),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Live<U> {
        match self {
            Live::Data(t) => Live::Data(f(t)),
            Live::Empty => Live::Empty,
            Live::Unavailable => Live::Unavailable,
        }
    }
}

/// Time until a vehicle reaches the stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arrival {
    /// At or about to reach the stop.
    Arriving,
    Minutes(u32),
    /// Scheduled clock time, as commuter rail boards give it.
    Clock(String),
    /// Board row with no estimate.
    Unknown,
}

impl Arrival {
    /// From seconds to arrival; a minute or less reads as arriving.
    pub fn from_seconds(seconds: u32) -> Self {
        if seconds > 60 {
            Arrival::Minutes(seconds / 60)
        } else {
            Arrival::Arriving
        }
    }
}

impl fmt::Display for Arrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arrival::Arriving => f.write_str("Llegando"),
            Arrival::Minutes(m) => write!(f, "{m} min"),
            Arrival::Clock(t) => f.write_str(t),
            Arrival::Unknown => f.write_str("No disponible"),
        }
    }
}

/// One direction of one line at a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub line: String,
    pub destination: String,
    pub platform: Option<String>,
    pub times: Vec<Arrival>,
}

/// Upcoming departures at a stop, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Departures {
    pub rows: Vec<Departure>,
}

impl Departures {
    /// Rows grouped by line, keeping first-seen line order.
    pub fn by_line(&self) -> Vec<(&str, Vec<&Departure>)> {
        let mut groups: Vec<(&str, Vec<&Departure>)> = Vec::new();
        for row in &self.rows {
            match groups.iter_mut().find(|(line, _)| *line == row.line) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((row.line.as_str(), vec![row])),
            }
        }
        groups
    }
}

/// Station occupancy band reported by the bike-share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Low,
    Medium,
    High,
    Unknown,
}

impl Occupancy {
    /// From the provider's 0-3 light code.
    pub fn from_light(light: u8) -> Self {
        match light {
            0 => Occupancy::Low,
            1 => Occupancy::Medium,
            2 => Occupancy::High,
            _ => Occupancy::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Occupancy::Low => "Baja",
            Occupancy::Medium => "Media",
            Occupancy::High => "Alta",
            Occupancy::Unknown => "No disponible",
        }
    }
}

/// Bike-share station state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockStatus {
    pub active: bool,
    pub address: String,
    pub occupancy: Occupancy,
    pub bikes: u32,
    pub free_docks: u32,
    pub reserved: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherNow {
    pub summary: String,
    pub temperature: f32,
    pub humidity: u32,
    /// Chance of rain, percent.
    pub rain: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourForecast {
    pub at: DateTime<Utc>,
    pub summary: String,
    pub temperature: f32,
    pub humidity: u32,
    pub rain: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub day: DateTime<Utc>,
    pub summary: String,
    pub min: f32,
    pub max: f32,
    pub humidity: u32,
    pub rain: u32,
}

/// Current conditions plus short and medium range forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub now: WeatherNow,
    pub hours: Vec<HourForecast>,
    pub days: Vec<DayForecast>,
}

/// Transit card contract and validity dates, as the provider formats them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardStatus {
    pub kind: String,
    pub first_use_deadline: String,
    pub first_use: String,
    pub expiry: String,
}
