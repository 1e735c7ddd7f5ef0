//! Transport modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown mode code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode: {0}")]
pub struct InvalidMode(pub String);

/// A transport category.
///
/// The wire code (`metro`, `cerc`, `emt`, `urb`, `bici`) is what travels
/// inside tokens and what the user store keys favorites by, so it never
/// contains the token delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Metro,
    #[serde(rename = "cerc")]
    CommuterRail,
    #[serde(rename = "emt")]
    BusUrban,
    #[serde(rename = "urb")]
    BusInterurban,
    #[serde(rename = "bici")]
    Bikeshare,
}

impl Mode {
    /// Every mode, in main-menu order.
    pub const ALL: [Mode; 5] = [
        Mode::Bikeshare,
        Mode::Metro,
        Mode::CommuterRail,
        Mode::BusUrban,
        Mode::BusInterurban,
    ];

    /// Parse a wire code.
    pub fn parse(s: &str) -> Result<Self, InvalidMode> {
        match s {
            "metro" => Ok(Mode::Metro),
            "cerc" => Ok(Mode::CommuterRail),
            "emt" => Ok(Mode::BusUrban),
            "urb" => Ok(Mode::BusInterurban),
            "bici" => Ok(Mode::Bikeshare),
            other => Err(InvalidMode(other.to_string())),
        }
    }

    /// Map a user-facing transport word (command name or inline keyword)
    /// to a mode. Input is expected already normalized to lowercase ASCII.
    pub fn from_command(word: &str) -> Option<Self> {
        match word {
            "metro" => Some(Mode::Metro),
            "cercanias" => Some(Mode::CommuterRail),
            "emt" => Some(Mode::BusUrban),
            "interurbano" => Some(Mode::BusInterurban),
            "bici" => Some(Mode::Bikeshare),
            _ => None,
        }
    }

    /// The wire code used in tokens and persisted favorites.
    pub fn code(self) -> &'static str {
        match self {
            Mode::Metro => "metro",
            Mode::CommuterRail => "cerc",
            Mode::BusUrban => "emt",
            Mode::BusInterurban => "urb",
            Mode::Bikeshare => "bici",
        }
    }

    /// The command that queries this mode.
    pub fn command(self) -> &'static str {
        match self {
            Mode::Metro => "metro",
            Mode::CommuterRail => "cercanias",
            Mode::BusUrban => "emt",
            Mode::BusInterurban => "interurbano",
            Mode::Bikeshare => "bici",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Metro => "Metro",
            Mode::CommuterRail => "Cercanías",
            Mode::BusUrban => "EMT",
            Mode::BusInterurban => "Interurbano",
            Mode::Bikeshare => "BiciMAD",
        }
    }

    /// Noun for a single stop of this mode.
    pub fn stop_noun(self) -> &'static str {
        if self.is_bus() { "parada" } else { "estación" }
    }

    /// Fixed literal the upstream provider prepends to numeric stop codes.
    pub fn id_prefix(self) -> Option<&'static str> {
        match self {
            Mode::BusUrban => Some("EMT_"),
            Mode::BusInterurban => Some("CRTM_par_8_"),
            _ => None,
        }
    }

    /// Modes browsed through line and letter menus.
    pub fn is_line_aware(self) -> bool {
        matches!(self, Mode::Metro | Mode::CommuterRail)
    }

    /// Modes queried by typed name or number only.
    pub fn is_bus(self) -> bool {
        matches!(self, Mode::BusUrban | Mode::BusInterurban)
    }

    /// Modes whose stops can be addressed by a public number.
    pub fn accepts_number(self) -> bool {
        matches!(
            self,
            Mode::BusUrban | Mode::BusInterurban | Mode::Bikeshare
        )
    }

    /// Strip the provider prefix from an external id, leaving the code the
    /// user types.
    pub fn public_code(self, external_id: &str) -> &str {
        match self.id_prefix() {
            Some(prefix) => external_id.strip_prefix(prefix).unwrap_or(external_id),
            None => external_id,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::parse(s)
    }
}
