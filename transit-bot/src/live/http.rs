//! Live data HTTP adapter.
//!
//! Talks to the provider gateway, one JSON document per query:
//!
//! - `GET {base}/times/{mode}/{stop}`: departure board
//! - `GET {base}/bici/{station}`: bike-share dock state
//! - `GET {base}/weather`: conditions and forecast
//! - `GET {base}/card/{number}`: transit card titles
//!
//! Every failure is logged and folded into [`Live::Unavailable`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{CardNumber, Mode};

use super::LiveSource;
use super::error::LiveError;
use super::types::{
    Arrival, CardStatus, DayForecast, Departure, Departures, DockStatus, Forecast, HourForecast, Live,
    Occupancy, WeatherNow,
};

/// Default gateway URL.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081/live";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Bodies some providers send with a 200 status when throttling.
const THROTTLE_BODIES: [&str; 2] = ["Rate exceeded.", "Error: could not handle the request"];

/// Configuration for the live adapter.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Optional API key for x-apikey header authentication
    pub api_key: Option<String>,
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LiveConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Live data client backed by the provider gateway.
#[derive(Debug, Clone)]
pub struct HttpLiveSource {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpLiveSource {
    pub fn new(config: LiveConfig) -> Result<Self, LiveError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| LiveError::Config("invalid API key format".to_string()))?;
            headers.insert(HeaderName::from_static("x-apikey"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, LiveError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| LiveError::Config("semaphore closed".to_string()))?;

        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "live query");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(LiveError::from_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LiveError::RateLimited);
        }

        let body = response.text().await.map_err(LiveError::from_transport)?;
        if THROTTLE_BODIES.contains(&body.trim_end()) {
            return Err(LiveError::RateLimited);
        }
        if !status.is_success() {
            return Err(LiveError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| LiveError::Json {
            message: e.to_string(),
        })
    }
}

/// Fold an adapter result into the tri-state.
fn settle<T>(what: &str, result: Result<Option<T>, LiveError>) -> Live<T> {
    match result {
        Ok(Some(data)) => Live::Data(data),
        Ok(None) => Live::Empty,
        Err(e) => {
            warn!(query = what, error = %e, "live data unavailable");
            Live::Unavailable
        }
    }
}

#[async_trait]
impl LiveSource for HttpLiveSource {
    async fn departures(&self, mode: Mode, stop_id: &str) -> Live<Departures> {
        let path = format!("times/{}/{}", mode.code(), stop_id);
        let result = self.get::<WireBoard>(&path).await.and_then(convert_board);
        settle("departures", result)
    }

    async fn dock(&self, station_id: &str) -> Live<DockStatus> {
        let path = format!("bici/{station_id}");
        let result = self.get::<WireDock>(&path).await.map(convert_dock);
        settle("dock", result)
    }

    async fn forecast(&self) -> Live<Forecast> {
        let result = self.get::<WireWeather>("weather").await.map(convert_weather);
        settle("forecast", result)
    }

    async fn card(&self, number: &CardNumber) -> Live<CardStatus> {
        let path = format!("card/{number}");
        let result = self.get::<WireCard>(&path).await.map(convert_card);
        settle("card", result)
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct WireBoard {
    #[serde(default)]
    times: Vec<WireRow>,
    /// Present when the provider answers with an error document.
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    line: String,
    #[serde(default)]
    destination: String,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    arrivals: Vec<WireArrival>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireArrival {
    Seconds { seconds: u32 },
    Clock { clock: String },
}

#[derive(Debug, Deserialize)]
struct WireDock {
    #[serde(default)]
    data: Vec<WireStation>,
}

#[derive(Debug, Deserialize)]
struct WireStation {
    activate: serde_json::Value,
    #[serde(default)]
    address: String,
    #[serde(default)]
    light: u8,
    dock_bikes: u32,
    free_bases: u32,
    #[serde(default)]
    reservations_count: u32,
    total_bases: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWeather {
    now_data: WireWeatherPoint,
    next_hours_data: WireWeatherList,
    next_days_data: WireWeatherList,
}

#[derive(Debug, Deserialize)]
struct WireWeatherList {
    #[serde(default)]
    list: Vec<WireWeatherPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWeatherPoint {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    humidity: f32,
    #[serde(default)]
    precip_probability: Option<f32>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    temp_min: Option<f32>,
    #[serde(default)]
    temp_max: Option<f32>,
    #[serde(default)]
    unix_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCard {
    #[serde(default)]
    ctm_titles: Vec<WireTitle>,
}

#[derive(Debug, Deserialize)]
struct WireTitle {
    num: String,
    #[serde(default)]
    data: Option<Vec<WireField>>,
    #[serde(default)]
    carga: Option<WireFields>,
    #[serde(default)]
    recarga: Option<WireFields>,
}

#[derive(Debug, Deserialize)]
struct WireFields {
    #[serde(default)]
    data: Vec<WireField>,
}

#[derive(Debug, Deserialize)]
struct WireField {
    name: String,
    value: String,
}

// ============================================================================
// Conversion
// ============================================================================

fn convert_board(board: WireBoard) -> Result<Option<Departures>, LiveError> {
    if let Some(code) = board.code {
        return Err(LiveError::Api {
            status: 200,
            message: format!("error document: {code}"),
        });
    }
    if board.times.is_empty() {
        return Ok(None);
    }
    let rows = board
        .times
        .into_iter()
        .map(|row| {
            let mut times: Vec<Arrival> = row
                .arrivals
                .into_iter()
                .map(|a| match a {
                    WireArrival::Seconds { seconds } => Arrival::from_seconds(seconds),
                    WireArrival::Clock { clock } => Arrival::Clock(clock),
                })
                .collect();
            if times.is_empty() {
                times.push(Arrival::Unknown);
            }
            Departure {
                line: row.line,
                destination: row.destination,
                platform: row.platform.filter(|p| !p.trim().is_empty()),
                times,
            }
        })
        .collect();
    Ok(Some(Departures { rows }))
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

fn convert_dock(dock: WireDock) -> Option<DockStatus> {
    let station = dock.data.into_iter().next()?;
    let address = station.address.trim().trim_end_matches(',').to_string();
    Some(DockStatus {
        active: truthy(&station.activate),
        address,
        occupancy: Occupancy::from_light(station.light),
        bikes: station.dock_bikes,
        free_docks: station.free_bases,
        reserved: station.reservations_count,
        total: station.total_bases,
    })
}

fn percent(p: Option<f32>) -> u32 {
    p.map_or(0, |p| (p * 100.0).round().max(0.0) as u32)
}

fn timestamp(unix: Option<i64>) -> Option<DateTime<Utc>> {
    unix.and_then(|t| DateTime::from_timestamp(t, 0))
}

fn convert_weather(weather: WireWeather) -> Option<Forecast> {
    let now = weather.now_data;
    let now = WeatherNow {
        summary: now.summary,
        temperature: now.temperature?,
        humidity: now.humidity.round() as u32,
        rain: percent(now.precip_probability),
    };
    let hours = weather
        .next_hours_data
        .list
        .into_iter()
        .filter_map(|h| {
            Some(HourForecast {
                at: timestamp(h.unix_time)?,
                temperature: h.temperature?,
                humidity: h.humidity.round() as u32,
                rain: percent(h.precip_probability),
                summary: h.summary,
            })
        })
        .collect();
    let days = weather
        .next_days_data
        .list
        .into_iter()
        .filter_map(|d| {
            Some(DayForecast {
                day: timestamp(d.unix_time)?,
                min: d.temp_min?,
                max: d.temp_max?,
                humidity: d.humidity.round() as u32,
                rain: percent(d.precip_probability),
                summary: d.summary,
            })
        })
        .collect();
    Some(Forecast { now, hours, days })
}

/// Field names for (first-use deadline, first use, expiry), by charge kind.
const CHARGE_FIELDS: [&str; 3] = ["ChargeFirstUseDate", "AccessEventInFirstPayDateCe", "ChargeEndDate"];
const RECHARGE_FIELDS: [&str; 3] = [
    "RechargeFirstUseDate",
    "AccessEventInFirstPayDateRrge",
    "RechargeEndDate",
];

fn convert_card(card: WireCard) -> Option<CardStatus> {
    let title = card.ctm_titles.into_iter().find(|t| t.num == "1")?;
    let (charge, names) = match (title.recarga, title.carga) {
        (Some(recharge), _) => (recharge.data, RECHARGE_FIELDS),
        (None, Some(charge)) => (charge.data, CHARGE_FIELDS),
        (None, None) => return None,
    };
    let lookup = |fields: &[WireField], name: &str| {
        fields
            .iter()
            .find(|f| f.name == name)
            .map_or_else(|| "-".to_string(), |f| f.value.clone())
    };
    let contract = title.data.unwrap_or_default();
    Some(CardStatus {
        kind: lookup(&contract, "ContractName"),
        first_use_deadline: lookup(&charge, names[0]),
        first_use: lookup(&charge, names[1]),
        expiry: lookup(&charge, names[2]),
    })
}
