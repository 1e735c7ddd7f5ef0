//! Mock live source for tests and offline development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{CardNumber, Mode};

use super::LiveSource;
use super::types::{CardStatus, Departures, DockStatus, Forecast, Live};

/// Serves canned answers. Anything not configured is `Unavailable`.
///
/// Counts every query so tests can check that live data is fetched on each
/// render rather than reused.
#[derive(Debug, Default)]
pub struct MockLiveSource {
    departures: HashMap<(Mode, String), Live<Departures>>,
    docks: HashMap<String, Live<DockStatus>>,
    forecast: Option<Live<Forecast>>,
    cards: HashMap<String, Live<CardStatus>>,
    calls: AtomicUsize,
}

impl MockLiveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_departures(mut self, mode: Mode, stop_id: &str, live: Live<Departures>) -> Self {
        self.departures.insert((mode, stop_id.to_string()), live);
        self
    }

    pub fn with_dock(mut self, station_id: &str, live: Live<DockStatus>) -> Self {
        self.docks.insert(station_id.to_string(), live);
        self
    }

    pub fn with_forecast(mut self, live: Live<Forecast>) -> Self {
        self.forecast = Some(live);
        self
    }

    pub fn with_card(mut self, number: &str, live: Live<CardStatus>) -> Self {
        self.cards.insert(number.to_string(), live);
        self
    }

    /// Number of queries served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LiveSource for MockLiveSource {
    async fn departures(&self, mode: Mode, stop_id: &str) -> Live<Departures> {
        self.hit();
        self.departures
            .get(&(mode, stop_id.to_string()))
            .cloned()
            .unwrap_or(Live::Unavailable)
    }

    async fn dock(&self, station_id: &str) -> Live<DockStatus> {
        self.hit();
        self.docks.get(station_id).cloned().unwrap_or(Live::Unavailable)
    }

    async fn forecast(&self) -> Live<Forecast> {
        self.hit();
        self.forecast.clone().unwrap_or(Live::Unavailable)
    }

    async fn card(&self, number: &CardNumber) -> Live<CardStatus> {
        self.hit();
        self.cards
            .get(number.as_str())
            .cloned()
            .unwrap_or(Live::Unavailable)
    }
}
