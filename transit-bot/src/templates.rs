//! Askama templates for message bodies.
//!
//! Bodies are chat HTML: askama escapes every interpolated value, so stop
//! names and provider strings can't inject markup.

use askama::Template;
use chrono::Local;
use tracing::warn;

use crate::domain::Mode;
use crate::live::{CardStatus, Departures, DockStatus, Forecast, Live};

/// Hours and days shown in the forecast.
const FORECAST_ROWS: usize = 9;

/// Render a template, degrading to a short error line instead of failing
/// the whole reply.
pub fn render(template: &impl Template) -> String {
    template.render().unwrap_or_else(|e| {
        warn!(error = %e, "template render failed");
        format!("Template error: {e}")
    })
}

/// Fixed apology when a mode's live service cannot be reached.
pub fn outage_message(mode: Mode) -> String {
    let service = match mode {
        Mode::Metro => "metro",
        Mode::CommuterRail => "renfe",
        Mode::BusUrban => "EMT",
        Mode::BusInterurban => "interurbanos",
        Mode::Bikeshare => "BiciMAD",
    };
    format!("Debido a un error en el servicio de {service} no es posible obtener información en estos momentos.")
}

// ============================================================================
// Stop times
// ============================================================================

#[derive(Template)]
#[template(path = "stop_times.html")]
pub struct StopTimesTemplate {
    pub title: String,
    pub available: bool,
    pub outage: String,
    pub groups: Vec<LineGroupView>,
}

#[derive(Debug, Clone)]
pub struct LineGroupView {
    pub line: String,
    pub rows: Vec<DepartureView>,
}

#[derive(Debug, Clone)]
pub struct DepartureView {
    pub destination: String,
    /// Empty when the board has no platform.
    pub platform: String,
    pub times: String,
}

impl StopTimesTemplate {
    /// `heading` is the stop as shown to the user, e.g. `Aluche (658)`.
    pub fn new(mode: Mode, heading: &str, live: &Live<Departures>) -> Self {
        let groups = live
            .data()
            .map(|deps| {
                deps.by_line()
                    .into_iter()
                    .map(|(line, rows)| LineGroupView {
                        line: line.to_string(),
                        rows: rows
                            .into_iter()
                            .map(|row| DepartureView {
                                destination: row.destination.clone(),
                                platform: row.platform.clone().unwrap_or_default(),
                                times: row
                                    .times
                                    .iter()
                                    .map(ToString::to_string)
                                    .collect::<Vec<_>>()
                                    .join(", "),
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: format!("Tiempos en {} {}", mode.stop_noun(), heading),
            available: live.is_available(),
            outage: outage_message(mode),
            groups,
        }
    }
}

// ============================================================================
// Bike-share
// ============================================================================

#[derive(Template)]
#[template(path = "dock.html")]
pub struct DockTemplate {
    pub title: String,
    pub available: bool,
    pub found: bool,
    pub outage: String,
    pub state: &'static str,
    pub address: String,
    pub occupancy: &'static str,
    pub bikes: u32,
    pub free_docks: u32,
    pub reserved: u32,
    pub total: u32,
}

impl DockTemplate {
    pub fn new(heading: &str, live: &Live<DockStatus>) -> Self {
        let mut template = Self {
            title: heading.to_string(),
            available: live.is_available(),
            found: false,
            outage: outage_message(Mode::Bikeshare),
            state: "",
            address: String::new(),
            occupancy: "",
            bikes: 0,
            free_docks: 0,
            reserved: 0,
            total: 0,
        };
        if let Some(dock) = live.data() {
            template.found = true;
            template.state = if dock.active { "activa" } else { "inactiva" };
            template.address = dock.address.clone();
            template.occupancy = dock.occupancy.label();
            template.bikes = dock.bikes;
            template.free_docks = dock.free_docks;
            template.reserved = dock.reserved;
            template.total = dock.total;
        }
        template
    }
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Template)]
#[template(path = "weather.html")]
pub struct WeatherTemplate {
    pub available: bool,
    pub now: NowView,
    pub hours: Vec<HourView>,
    pub days: Vec<DayView>,
}

#[derive(Debug, Clone, Default)]
pub struct NowView {
    pub summary: String,
    pub temperature: String,
    pub humidity: u32,
    pub rain: u32,
}

#[derive(Debug, Clone)]
pub struct HourView {
    /// Local `HH:MM`.
    pub label: String,
    pub summary: String,
    pub temperature: String,
    pub humidity: u32,
    pub rain: u32,
}

#[derive(Debug, Clone)]
pub struct DayView {
    /// Local `dd/mm`.
    pub label: String,
    pub summary: String,
    pub min: String,
    pub max: String,
    pub humidity: u32,
    pub rain: u32,
}

impl WeatherTemplate {
    pub fn new(live: &Live<Forecast>) -> Self {
        let Some(forecast) = live.data() else {
            return Self {
                available: false,
                now: NowView::default(),
                hours: Vec::new(),
                days: Vec::new(),
            };
        };
        Self {
            available: true,
            now: NowView {
                summary: forecast.now.summary.clone(),
                temperature: format!("{:.1}", forecast.now.temperature),
                humidity: forecast.now.humidity,
                rain: forecast.now.rain,
            },
            hours: forecast
                .hours
                .iter()
                .take(FORECAST_ROWS)
                .map(|h| HourView {
                    label: h.at.with_timezone(&Local).format("%H:%M").to_string(),
                    summary: h.summary.clone(),
                    temperature: format!("{:.1}", h.temperature),
                    humidity: h.humidity,
                    rain: h.rain,
                })
                .collect(),
            days: forecast
                .days
                .iter()
                .take(FORECAST_ROWS)
                .map(|d| DayView {
                    label: d.day.with_timezone(&Local).format("%d/%m").to_string(),
                    summary: d.summary.clone(),
                    min: format!("{:.1}", d.min),
                    max: format!("{:.1}", d.max),
                    humidity: d.humidity,
                    rain: d.rain,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Transit card
// ============================================================================

#[derive(Template)]
#[template(path = "card.html")]
pub struct CardTemplate {
    pub available: bool,
    pub valid: bool,
    pub kind: String,
    pub first_use_deadline: String,
    pub first_use: String,
    pub expiry: String,
}

impl CardTemplate {
    pub fn new(live: &Live<CardStatus>) -> Self {
        match live.data() {
            Some(card) => Self {
                available: true,
                valid: true,
                kind: card.kind.clone(),
                first_use_deadline: card.first_use_deadline.clone(),
                first_use: card.first_use.clone(),
                expiry: card.expiry.clone(),
            },
            None => Self {
                available: live.is_available(),
                valid: false,
                kind: String::new(),
                first_use_deadline: String::new(),
                first_use: String::new(),
                expiry: String::new(),
            },
        }
    }
}

// ============================================================================
// Help
// ============================================================================

#[derive(Template)]
#[template(path = "help.html")]
pub struct HelpTemplate {
    /// First `/start`: prefix a welcome line.
    pub welcome: bool,
}

/// Confirmation after renaming a favorite. Both names are user input.
#[derive(Template)]
#[template(
    source = "El nombre de la estación/parada '{{ old }}' ahora será '{{ new }}'",
    ext = "html"
)]
pub struct RenamedTemplate<'a> {
    pub old: &'a str,
    pub new: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{Arrival, Departure, Occupancy, WeatherNow};

    fn departures() -> Live<Departures> {
        Live::Data(Departures {
            rows: vec![
                Departure {
                    line: "1".into(),
                    destination: "Pinar de Chamartín".into(),
                    platform: Some("1".into()),
                    times: vec![Arrival::Arriving, Arrival::Minutes(6)],
                },
                Departure {
                    line: "1".into(),
                    destination: "Valdecarros".into(),
                    platform: None,
                    times: vec![Arrival::Minutes(3)],
                },
            ],
        })
    }

    #[test]
    fn stop_times_lists_lines() {
        let html = render(&StopTimesTemplate::new(Mode::Metro, "Sol", &departures()));
        assert!(html.starts_with("Tiempos en estación Sol"));
        assert!(html.contains("<b>Línea 1:</b>"));
        assert_eq!(html.matches("<b>Línea 1:</b>").count(), 1);
        assert!(html.contains("<code>Pinar de Chamartín</code>"));
        assert!(html.contains("- Andén: <code>1</code>"));
        assert!(html.contains("<code>Llegando, 6 min</code>"));
        assert_eq!(html.matches("Andén").count(), 1);
    }

    #[test]
    fn stop_times_empty_and_unavailable() {
        let html = render(&StopTimesTemplate::new(Mode::BusUrban, "Aluche (658)", &Live::Empty));
        assert!(html.starts_with("Tiempos en parada Aluche (658)"));
        assert!(html.contains("No hay tiempos disponibles."));

        let html = render(&StopTimesTemplate::new(Mode::CommuterRail, "Atocha", &Live::Unavailable));
        assert!(html.contains("servicio de renfe"));
    }

    #[test]
    fn stop_names_are_escaped() {
        let html = render(&StopTimesTemplate::new(Mode::Metro, "<b>x</b>", &Live::Empty));
        assert!(!html.contains("<b>x</b>"));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn dock_states() {
        let live = Live::Data(DockStatus {
            active: true,
            address: "Calle Alcalá 1".into(),
            occupancy: Occupancy::Medium,
            bikes: 4,
            free_docks: 20,
            reserved: 0,
            total: 24,
        });
        let html = render(&DockTemplate::new("Casal (77)", &live));
        assert!(html.contains("Estadísticas de estación Casal (77)"));
        assert!(html.contains("<code>activa</code>"));
        assert!(html.contains("<code>Media</code>"));
        assert!(html.contains("<code>4/24</code>"));

        let html = render(&DockTemplate::new("Casal (77)", &Live::Empty));
        assert!(html.contains("No hay información disponible."));
        let html = render(&DockTemplate::new("Casal (77)", &Live::Unavailable));
        assert!(html.contains("servicio de BiciMAD"));
    }

    #[test]
    fn weather_formats_temperatures() {
        let live = Live::Data(Forecast {
            now: WeatherNow {
                summary: "Despejado".into(),
                temperature: 21.46,
                humidity: 40,
                rain: 0,
            },
            hours: Vec::new(),
            days: Vec::new(),
        });
        let html = render(&WeatherTemplate::new(&live));
        assert!(html.contains("<code>21.5ºC</code>"));
        assert!(html.contains("<code>Despejado</code>"));

        let html = render(&WeatherTemplate::new(&Live::Unavailable));
        assert!(html.contains("No es posible obtener información del tiempo"));
    }

    #[test]
    fn card_states() {
        let live = Live::Data(CardStatus {
            kind: "Abono Joven".into(),
            first_use_deadline: "2024-02-10".into(),
            first_use: "2024-02-01".into(),
            expiry: "2024-03-01".into(),
        });
        let html = render(&CardTemplate::new(&live));
        assert!(html.contains("<code>Abono Joven</code>"));
        assert!(html.contains("<code>2024-03-01</code>"));

        assert!(render(&CardTemplate::new(&Live::Empty)).contains("Número de tarjeta inválido"));
        assert!(render(&CardTemplate::new(&Live::Unavailable)).contains("No es posible consultar"));
    }

    #[test]
    fn renamed_escapes_user_input() {
        let html = render(&RenamedTemplate {
            old: "Sol",
            new: "<casa>",
        });
        assert_eq!(
            html,
            "El nombre de la estación/parada 'Sol' ahora será '&lt;casa&gt;'"
        );
    }

    #[test]
    fn help_welcome() {
        let html = render(&HelpTemplate { welcome: true });
        assert!(html.starts_with("Estupendo"));
        assert!(html.contains("/favoritos"));
        let html = render(&HelpTemplate { welcome: false });
        assert!(html.starts_with("Esto es lo que puedo hacer por ti"));
    }
}
