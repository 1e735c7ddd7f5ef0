//! Provider feed adapters.
//!
//! Each upstream publishes its stop list in its own shape. These adapters
//! turn a feed document into [`RawStop`] records in provider order; nothing
//! here decides what is kept, that is the catalog builder's job.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::domain::Mode;

use super::error::CatalogError;
use super::raw::RawStop;

/// A JSON scalar that providers emit as either a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

fn opt_string(v: Option<Scalar>) -> Option<String> {
    v.map(Scalar::into_string)
}

// ---------------------------------------------------------------------------
// Route feeds (EMT, interurban): routes with their stop sequences
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RouteFeed {
    #[serde(default)]
    elements: Vec<RouteElement>,
    #[serde(default, rename = "uiStopIndexes")]
    stop_lines: HashMap<String, Vec<Scalar>>,
}

#[derive(Debug, Deserialize)]
struct RouteElement {
    r: RouteInfo,
    #[serde(default)]
    sts: Vec<RouteStop>,
}

#[derive(Debug, Deserialize)]
struct RouteInfo {
    /// Internal route id.
    i: Scalar,
    /// Public line code.
    #[serde(default)]
    h: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
struct RouteStop {
    #[serde(default)]
    i: Option<Scalar>,
    #[serde(default)]
    n: Option<String>,
}

fn from_route_feed(feed: RouteFeed) -> Vec<RawStop> {
    let public_codes: HashMap<String, String> = feed
        .elements
        .iter()
        .filter_map(|el| {
            let code = el.r.h.clone().map(Scalar::into_string)?;
            Some((el.r.i.clone().into_string(), code))
        })
        .collect();

    let mut seen = HashSet::new();
    let mut stops = Vec::new();
    for element in feed.elements {
        for st in element.sts {
            let id = opt_string(st.i);
            // Stops appear once per route they serve; keep the first.
            if let Some(id) = &id
                && !seen.insert(id.clone())
            {
                continue;
            }
            let lines = id
                .as_ref()
                .and_then(|id| feed.stop_lines.get(id))
                .map(|routes| {
                    routes
                        .iter()
                        .map(|r| {
                            let internal = r.clone().into_string();
                            public_codes.get(&internal).cloned().unwrap_or(internal)
                        })
                        .collect()
                })
                .unwrap_or_default();
            stops.push(RawStop {
                name: st.n,
                id,
                lines,
                ..RawStop::default()
            });
        }
    }
    stops
}

// ---------------------------------------------------------------------------
// Bike-share: public number plus internal id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BikeFeed {
    #[serde(default)]
    data: Vec<BikeStation>,
}

#[derive(Debug, Deserialize)]
struct BikeStation {
    #[serde(default)]
    number: Option<Scalar>,
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    name: Option<String>,
}

fn from_bike_feed(feed: BikeFeed) -> Vec<RawStop> {
    feed.data
        .into_iter()
        .map(|st| RawStop {
            name: st.name,
            id: opt_string(st.number),
            live_id: opt_string(st.id),
            ..RawStop::default()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Metro network: one record per platform and direction
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MetroFeed {
    red: MetroNetwork,
}

#[derive(Debug, Deserialize)]
struct MetroNetwork {
    estaciones: MetroStations,
}

#[derive(Debug, Deserialize)]
struct MetroStations {
    #[serde(default)]
    estacion: Vec<MetroPlatform>,
}

#[derive(Debug, Deserialize)]
struct MetroPlatform {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    linea: Option<Scalar>,
    #[serde(default)]
    idweb: Option<Scalar>,
    #[serde(default, rename = "idMatriz")]
    id_matriz: Option<Scalar>,
    #[serde(default, rename = "idOcupacion")]
    id_ocupacion: Option<Scalar>,
}

fn from_metro_feed(feed: MetroFeed) -> Vec<RawStop> {
    feed.red
        .estaciones
        .estacion
        .into_iter()
        .map(|p| RawStop {
            name: p.name,
            lines: opt_string(p.linea).into_iter().collect(),
            web_id: opt_string(p.idweb),
            matrix_id: opt_string(p.id_matriz),
            occupancy_id: opt_string(p.id_ocupacion),
            ..RawStop::default()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Commuter rail: flat station list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RailStation {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "lineIds")]
    line_ids: Vec<Scalar>,
}

fn from_rail_list(list: Vec<RailStation>) -> Vec<RawStop> {
    list.into_iter()
        .map(|st| RawStop {
            name: st.name,
            id: opt_string(st.id),
            lines: st.line_ids.into_iter().map(Scalar::into_string).collect(),
            ..RawStop::default()
        })
        .collect()
}

/// Parse a provider feed document for a mode.
pub fn parse_feed(mode: Mode, body: &str) -> Result<Vec<RawStop>, CatalogError> {
    let json = |e: serde_json::Error| CatalogError::Json {
        mode,
        message: e.to_string(),
    };
    let stops = match mode {
        Mode::BusUrban | Mode::BusInterurban => {
            from_route_feed(serde_json::from_str(body).map_err(json)?)
        }
        Mode::Bikeshare => from_bike_feed(serde_json::from_str(body).map_err(json)?),
        Mode::Metro => from_metro_feed(serde_json::from_str(body).map_err(json)?),
        Mode::CommuterRail => from_rail_list(serde_json::from_str(body).map_err(json)?),
    };
    Ok(stops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_feed_maps_internal_routes_to_public_codes() {
        let body = r#"{
            "elements": [
                {"r": {"i": "R1", "h": "34", "n": "Cibeles - Aluche"},
                 "sts": [{"i": "EMT_658", "n": "Aluche"}, {"i": "EMT_70", "n": "Cibeles"}]},
                {"r": {"i": "R2", "h": "N1", "n": "Nocturno"},
                 "sts": [{"i": "EMT_658", "n": "Aluche"}, {"n": "Sin id"}]}
            ],
            "uiStopIndexes": {"EMT_658": ["R1", "R2"], "EMT_70": ["R1"]}
        }"#;
        let stops = parse_feed(Mode::BusUrban, body).unwrap();

        assert_eq!(stops.len(), 3);
        assert_eq!(stops[0].id.as_deref(), Some("EMT_658"));
        assert_eq!(stops[0].lines, vec!["34", "N1"]);
        assert_eq!(stops[1].lines, vec!["34"]);
        assert_eq!(stops[2].id, None);
    }

    #[test]
    fn bike_feed_uses_number_as_id() {
        let body = r#"{"data": [{"number": 77, "id": 1001, "name": "Casal"}]}"#;
        let stops = parse_feed(Mode::Bikeshare, body).unwrap();
        assert_eq!(stops[0].id.as_deref(), Some("77"));
        assert_eq!(stops[0].live_id.as_deref(), Some("1001"));
    }

    #[test]
    fn metro_feed_keeps_platform_ids() {
        let body = r#"{"red": {"estaciones": {"estacion": [
            {"name": "Sol", "linea": 1, "idweb": "10", "idMatriz": "SOL"},
            {"name": "Sol", "linea": "2", "idweb": "11", "idOcupacion": "O11"}
        ]}}}"#;
        let stops = parse_feed(Mode::Metro, body).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].lines, vec!["1"]);
        assert_eq!(stops[0].matrix_id.as_deref(), Some("SOL"));
        assert_eq!(stops[1].occupancy_id.as_deref(), Some("O11"));
    }

    #[test]
    fn rail_list() {
        let body = r#"[{"id": 18000, "name": "Atocha", "lineIds": ["C1", "C10"]}]"#;
        let stops = parse_feed(Mode::CommuterRail, body).unwrap();
        assert_eq!(stops[0].id.as_deref(), Some("18000"));
        assert_eq!(stops[0].lines, vec!["C1", "C10"]);
    }

    #[test]
    fn wrong_shape_is_json_error() {
        let err = parse_feed(Mode::Metro, "[]").unwrap_err();
        assert!(matches!(err, CatalogError::Json { mode: Mode::Metro, .. }));
    }
}
