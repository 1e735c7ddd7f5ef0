//! Live transit, bike-share, weather and card data.
//!
//! Nothing here is cached: every screen render asks again. Adapters never
//! return errors to callers, only the tri-state [`Live`], so a provider
//! outage degrades a single message instead of a whole flow.

mod error;
mod http;
mod mock;
mod types;

use async_trait::async_trait;

use crate::domain::{CardNumber, Mode};

pub use error::LiveError;
pub use http::{HttpLiveSource, LiveConfig};
pub use mock::MockLiveSource;
pub use types::{
    Arrival, CardStatus, DayForecast, Departure, Departures, DockStatus, Forecast, HourForecast, Live,
    Occupancy, WeatherNow,
};

/// Source of live data, one query per call.
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Departure board for a metro, commuter rail or bus stop.
    async fn departures(&self, mode: Mode, stop_id: &str) -> Live<Departures>;

    /// Bike-share station state, by the provider's internal station id.
    async fn dock(&self, station_id: &str) -> Live<DockStatus>;

    async fn forecast(&self) -> Live<Forecast>;

    /// Transit card status. `Empty` means the number is not a valid card.
    async fn card(&self, number: &CardNumber) -> Live<CardStatus>;
}
