//! Slash command names.

use crate::domain::{Mode, keyword};

/// A recognised command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    Weather,
    /// `abono [number | -1]`
    Card,
    /// Toggle whether looked-up cards are remembered.
    SaveCard,
    /// `bici|metro|cercanias|emt|interurbano <name | number>`
    Stops(Mode),
    Favorites,
    Rename,
    Help,
    Suggest,
    Report,
    Donate,
    Delete,
}

impl Command {
    /// Parse a command name, with or without the leading slash and a
    /// trailing `@botname`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.strip_prefix('/').unwrap_or(name);
        let name = name.split('@').next().unwrap_or(name);
        let name = keyword(name);
        let command = match name.as_str() {
            "start" => Command::Start,
            "menu" => Command::Menu,
            "tiempo" => Command::Weather,
            "abono" => Command::Card,
            "guardar" => Command::SaveCard,
            "favoritos" => Command::Favorites,
            "renombrar" => Command::Rename,
            "ayuda" => Command::Help,
            "sugerir" => Command::Suggest,
            "reportar" => Command::Report,
            "donar" => Command::Donate,
            "borrar" => Command::Delete,
            other => Command::Stops(Mode::from_command(other)?),
        };
        Some(command)
    }

    /// Commands usable before `/start`.
    pub fn needs_account(self) -> bool {
        self != Command::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names() {
        assert_eq!(Command::parse("start"), Some(Command::Start));
        assert_eq!(Command::parse("/tiempo"), Some(Command::Weather));
        assert_eq!(Command::parse("/abono@crtm_bot"), Some(Command::Card));
        assert_eq!(
            Command::parse("/cercanias"),
            Some(Command::Stops(Mode::CommuterRail))
        );
        assert_eq!(
            Command::parse("Interurbano"),
            Some(Command::Stops(Mode::BusInterurban))
        );
        assert_eq!(Command::parse("/donar"), Some(Command::Donate));
        assert_eq!(Command::parse("/donate"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn only_start_is_open() {
        assert!(!Command::Start.needs_account());
        assert!(Command::Menu.needs_account());
        assert!(Command::Stops(Mode::Metro).needs_account());
    }
}
