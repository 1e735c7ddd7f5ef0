//! Callback tokens.
//!
//! Every interactive button carries a compact token naming the screen it
//! leads to: a verb, a transport mode and up to four positional arguments,
//! joined by `_`:
//!
//! ```text
//! verb_mode_arg1[_arg2[_arg3[_arg4]]]
//! ```
//!
//! Tokens are decoded by taking the **last** N segments for the verb's fixed
//! arity, so verbs may themselves contain the delimiter (`time_train`) and
//! older tokens carrying extra leading qualifiers still decode
//! (`fav_<uid>_metro_3` reads as `fav_metro_3`). Arguments are validated at
//! construction and never contain the delimiter.
//!
//! Tokens that change favorites end with the [`Stamp`] of the catalog their
//! index was read from. Unstamped favorite tokens still decode, with no
//! stamp, and are never trusted to point at the stop they once did.

use std::fmt;

use crate::domain::{Bucket, DELIMITER, FavoriteKey, LineSelector, Mode, Stamp, StopIndex};

/// Callback payload ceiling of the chat platform, in bytes.
pub const MAX_TOKEN_LEN: usize = 64;

/// Where a stop's live-times screen was reached from.
///
/// Decides which navigation chrome the leaf shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The bus menu / direct number lookup.
    Bus,
    /// A result of a typed name search.
    Command,
    /// An inline-query result message.
    Inline,
    /// The favorites list.
    Favorite,
}

/// A decoded callback token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    MainMenu,
    Weather,
    Card,
    Favorites,
    RenameMenu,
    TrainMenu(Mode),
    BusMenu(Mode),
    LineMenu(Mode, LineSelector),
    StationMenu(Mode, LineSelector, Bucket),
    TrainTime {
        mode: Mode,
        line: LineSelector,
        letter: Bucket,
        index: StopIndex,
    },
    StopTime {
        mode: Mode,
        index: StopIndex,
        origin: Origin,
    },
    AddFavorite(Mode, StopIndex, Option<Stamp>),
    /// Save a stop from a line-browsing leaf, keeping its back chain.
    AddTrainFavorite {
        mode: Mode,
        line: LineSelector,
        letter: Bucket,
        index: StopIndex,
        stamp: Stamp,
    },
    RemoveFavorite(Mode, StopIndex, Option<Stamp>),
    /// Remove a favorite by key, for ids the catalog no longer has.
    DropFavorite(Mode, FavoriteKey),
    RenameFavorite(Mode, StopIndex, Stamp),
}

/// Verb table: wire name and argument count (mode included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    MainMenu,
    Weather,
    Card,
    Favorites,
    RenameMenu,
    TrainMenu,
    BusMenu,
    LineMenu,
    StationMenu,
    TrainTime,
    BusTime,
    CommandTime,
    InlineTime,
    FavoriteTime,
    TrainFavorite,
    AddFavorite,
    AddFavoriteUnstamped,
    RemoveFavorite,
    RemoveFavoriteUnstamped,
    DropFavorite,
    RenameFavorite,
}

impl Verb {
    /// Tried in order; stamped forms come before their unstamped fallbacks.
    const ALL: [Verb; 21] = [
        Verb::MainMenu,
        Verb::Weather,
        Verb::Card,
        Verb::Favorites,
        Verb::RenameMenu,
        Verb::TrainMenu,
        Verb::BusMenu,
        Verb::LineMenu,
        Verb::StationMenu,
        Verb::TrainTime,
        Verb::BusTime,
        Verb::CommandTime,
        Verb::InlineTime,
        Verb::FavoriteTime,
        Verb::TrainFavorite,
        Verb::AddFavorite,
        Verb::AddFavoriteUnstamped,
        Verb::RemoveFavorite,
        Verb::RemoveFavoriteUnstamped,
        Verb::DropFavorite,
        Verb::RenameFavorite,
    ];

    fn name(self) -> &'static str {
        match self {
            Verb::MainMenu => "main_menu",
            Verb::Weather => "weather_menu",
            Verb::Card => "card_menu",
            Verb::Favorites => "favorites_menu",
            Verb::RenameMenu => "rename_menu",
            Verb::TrainMenu => "train_menu",
            Verb::BusMenu => "bus_menu",
            Verb::LineMenu => "line_menu",
            Verb::StationMenu => "station_menu",
            Verb::TrainTime => "time_train",
            Verb::BusTime => "time_bus",
            Verb::CommandTime => "time_cli",
            Verb::InlineTime => "time_inline",
            Verb::FavoriteTime => "time_fav",
            Verb::TrainFavorite => "fav_train",
            Verb::AddFavorite | Verb::AddFavoriteUnstamped => "fav",
            Verb::RemoveFavorite | Verb::RemoveFavoriteUnstamped => "unfav",
            Verb::DropFavorite => "drop_fav",
            Verb::RenameFavorite => "rename_fav",
        }
    }

    fn arity(self) -> usize {
        match self {
            Verb::MainMenu | Verb::Weather | Verb::Card | Verb::Favorites | Verb::RenameMenu => 0,
            Verb::TrainMenu | Verb::BusMenu => 1,
            Verb::LineMenu
            | Verb::BusTime
            | Verb::CommandTime
            | Verb::InlineTime
            | Verb::FavoriteTime
            | Verb::AddFavoriteUnstamped
            | Verb::RemoveFavoriteUnstamped
            | Verb::DropFavorite => 2,
            Verb::StationMenu | Verb::AddFavorite | Verb::RemoveFavorite | Verb::RenameFavorite => 3,
            Verb::TrainTime => 4,
            Verb::TrainFavorite => 5,
        }
    }

    /// Trailing argument segments if `segments` is a token of this verb.
    fn args<'a>(self, segments: &'a [&'a str]) -> Option<&'a [&'a str]> {
        let verb: Vec<&str> = self.name().split(DELIMITER).collect();
        let arity = self.arity();
        if segments.len() < verb.len() + arity || segments[..verb.len()] != verb[..] {
            return None;
        }
        Some(&segments[segments.len() - arity..])
    }

    fn build(self, args: &[&str]) -> Option<Token> {
        let mode = || Mode::parse(args[0]).ok();
        let index = |i: usize| StopIndex::parse(args[i]);
        let stamp = |i: usize| Stamp::parse(args[i]);
        let token = match self {
            Verb::MainMenu => Token::MainMenu,
            Verb::Weather => Token::Weather,
            Verb::Card => Token::Card,
            Verb::Favorites => Token::Favorites,
            Verb::RenameMenu => Token::RenameMenu,
            Verb::TrainMenu => Token::TrainMenu(mode()?),
            Verb::BusMenu => Token::BusMenu(mode()?),
            Verb::LineMenu => Token::LineMenu(mode()?, LineSelector::parse(args[1]).ok()?),
            Verb::StationMenu => Token::StationMenu(
                mode()?,
                LineSelector::parse(args[1]).ok()?,
                Bucket::parse(args[2]).ok()?,
            ),
            Verb::TrainTime => Token::TrainTime {
                mode: mode()?,
                line: LineSelector::parse(args[1]).ok()?,
                letter: Bucket::parse(args[2]).ok()?,
                index: index(3)?,
            },
            Verb::BusTime | Verb::CommandTime | Verb::InlineTime | Verb::FavoriteTime => {
                let origin = match self {
                    Verb::BusTime => Origin::Bus,
                    Verb::CommandTime => Origin::Command,
                    Verb::InlineTime => Origin::Inline,
                    _ => Origin::Favorite,
                };
                Token::StopTime {
                    mode: mode()?,
                    index: index(1)?,
                    origin,
                }
            }
            Verb::TrainFavorite => Token::AddTrainFavorite {
                mode: mode()?,
                line: LineSelector::parse(args[1]).ok()?,
                letter: Bucket::parse(args[2]).ok()?,
                index: index(3)?,
                stamp: stamp(4)?,
            },
            Verb::AddFavorite => Token::AddFavorite(mode()?, index(1)?, Some(stamp(2)?)),
            Verb::AddFavoriteUnstamped => Token::AddFavorite(mode()?, index(1)?, None),
            Verb::RemoveFavorite => Token::RemoveFavorite(mode()?, index(1)?, Some(stamp(2)?)),
            Verb::RemoveFavoriteUnstamped => Token::RemoveFavorite(mode()?, index(1)?, None),
            Verb::DropFavorite => Token::DropFavorite(mode()?, FavoriteKey::parse(args[1])?),
            Verb::RenameFavorite => Token::RenameFavorite(mode()?, index(1)?, stamp(2)?),
        };
        Some(token)
    }
}

impl Token {
    /// Decode a callback payload.
    ///
    /// Returns `None` for anything unrecognized: unknown verbs, wrong
    /// argument counts, unknown modes, malformed arguments. Callers treat
    /// that as a no-op.
    pub fn decode(data: &str) -> Option<Token> {
        let segments: Vec<&str> = data.split(DELIMITER).collect();
        Verb::ALL
            .into_iter()
            .find_map(|verb| verb.build(verb.args(&segments)?))
    }

    /// Encode for a button payload or inline result id.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    fn verb(&self) -> Verb {
        match self {
            Token::MainMenu => Verb::MainMenu,
            Token::Weather => Verb::Weather,
            Token::Card => Verb::Card,
            Token::Favorites => Verb::Favorites,
            Token::RenameMenu => Verb::RenameMenu,
            Token::TrainMenu(_) => Verb::TrainMenu,
            Token::BusMenu(_) => Verb::BusMenu,
            Token::LineMenu(..) => Verb::LineMenu,
            Token::StationMenu(..) => Verb::StationMenu,
            Token::TrainTime { .. } => Verb::TrainTime,
            Token::StopTime { origin, .. } => match origin {
                Origin::Bus => Verb::BusTime,
                Origin::Command => Verb::CommandTime,
                Origin::Inline => Verb::InlineTime,
                Origin::Favorite => Verb::FavoriteTime,
            },
            Token::AddTrainFavorite { .. } => Verb::TrainFavorite,
            Token::AddFavorite(_, _, Some(_)) => Verb::AddFavorite,
            Token::AddFavorite(_, _, None) => Verb::AddFavoriteUnstamped,
            Token::RemoveFavorite(_, _, Some(_)) => Verb::RemoveFavorite,
            Token::RemoveFavorite(_, _, None) => Verb::RemoveFavoriteUnstamped,
            Token::DropFavorite(..) => Verb::DropFavorite,
            Token::RenameFavorite(..) => Verb::RenameFavorite,
        }
    }

    /// Mode the token refers to, if any.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Token::MainMenu | Token::Weather | Token::Card | Token::Favorites | Token::RenameMenu => {
                None
            }
            Token::TrainMenu(m)
            | Token::BusMenu(m)
            | Token::LineMenu(m, _)
            | Token::StationMenu(m, ..)
            | Token::AddFavorite(m, ..)
            | Token::RemoveFavorite(m, ..)
            | Token::DropFavorite(m, _)
            | Token::RenameFavorite(m, ..) => Some(*m),
            Token::TrainTime { mode, .. }
            | Token::StopTime { mode, .. }
            | Token::AddTrainFavorite { mode, .. } => Some(*mode),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb().name())?;
        let d = DELIMITER;
        match self {
            Token::MainMenu | Token::Weather | Token::Card | Token::Favorites | Token::RenameMenu => {
                Ok(())
            }
            Token::TrainMenu(m) | Token::BusMenu(m) => write!(f, "{d}{m}"),
            Token::LineMenu(m, line) => write!(f, "{d}{m}{d}{line}"),
            Token::StationMenu(m, line, letter) => write!(f, "{d}{m}{d}{line}{d}{letter}"),
            Token::TrainTime {
                mode,
                line,
                letter,
                index,
            } => write!(f, "{d}{mode}{d}{line}{d}{letter}{d}{index}"),
            Token::StopTime { mode, index, .. } => write!(f, "{d}{mode}{d}{index}"),
            Token::AddTrainFavorite {
                mode,
                line,
                letter,
                index,
                stamp,
            } => write!(f, "{d}{mode}{d}{line}{d}{letter}{d}{index}{d}{stamp}"),
            Token::AddFavorite(m, i, stamp) | Token::RemoveFavorite(m, i, stamp) => {
                write!(f, "{d}{m}{d}{i}")?;
                match stamp {
                    Some(s) => write!(f, "{d}{s}"),
                    None => Ok(()),
                }
            }
            Token::DropFavorite(m, key) => write!(f, "{d}{m}{d}{key}"),
            Token::RenameFavorite(m, i, s) => write!(f, "{d}{m}{d}{i}{d}{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineId;

    fn line(s: &str) -> LineSelector {
        LineSelector::Line(LineId::parse(s).unwrap())
    }

    fn letter(c: char) -> Bucket {
        Bucket::new(c).unwrap()
    }

    fn stamp(s: &str) -> Stamp {
        Stamp::parse(s).unwrap()
    }

    #[test]
    fn wire_format() {
        assert_eq!(Token::MainMenu.encode(), "main_menu");
        assert_eq!(Token::TrainMenu(Mode::Metro).encode(), "train_menu_metro");
        assert_eq!(
            Token::LineMenu(Mode::CommuterRail, LineSelector::AllStations).encode(),
            "line_menu_cerc_A-Z"
        );
        assert_eq!(
            Token::TrainTime {
                mode: Mode::Metro,
                line: line("10"),
                letter: letter('Ó'),
                index: StopIndex(42),
            }
            .encode(),
            "time_train_metro_10_Ó_42"
        );
        assert_eq!(
            Token::StopTime {
                mode: Mode::BusUrban,
                index: StopIndex(5),
                origin: Origin::Command,
            }
            .encode(),
            "time_cli_emt_5"
        );
        assert_eq!(
            Token::RemoveFavorite(Mode::Bikeshare, StopIndex(3), Some(stamp("0a1f"))).encode(),
            "unfav_bici_3_0a1f"
        );
        assert_eq!(
            Token::AddTrainFavorite {
                mode: Mode::Metro,
                line: line("10"),
                letter: letter('S'),
                index: StopIndex(4),
                stamp: stamp("beef"),
            }
            .encode(),
            "fav_train_metro_10_S_4_beef"
        );
        let key = FavoriteKey::of("EMT_658");
        assert_eq!(
            Token::DropFavorite(Mode::BusUrban, key).encode(),
            format!("drop_fav_emt_{key}")
        );
    }

    #[test]
    fn decode_distinguishes_similar_verbs() {
        assert_eq!(
            Token::decode("fav_metro_1_00ff"),
            Some(Token::AddFavorite(Mode::Metro, StopIndex(1), Some(stamp("00ff"))))
        );
        assert_eq!(
            Token::decode("unfav_metro_1_00ff"),
            Some(Token::RemoveFavorite(Mode::Metro, StopIndex(1), Some(stamp("00ff"))))
        );
        assert_eq!(
            Token::decode("fav_train_metro_1_S_0_00ff"),
            Some(Token::AddTrainFavorite {
                mode: Mode::Metro,
                line: line("1"),
                letter: letter('S'),
                index: StopIndex(0),
                stamp: stamp("00ff"),
            })
        );
        assert_eq!(
            Token::decode("time_fav_metro_1"),
            Some(Token::StopTime {
                mode: Mode::Metro,
                index: StopIndex(1),
                origin: Origin::Favorite
            })
        );
        assert_eq!(
            Token::decode("rename_fav_metro_1_00ff"),
            Some(Token::RenameFavorite(Mode::Metro, StopIndex(1), stamp("00ff")))
        );
        assert_eq!(Token::decode("rename_fav_metro_1"), None);
        assert_eq!(Token::decode("rename_menu"), Some(Token::RenameMenu));
    }

    #[test]
    fn legacy_qualifier_still_decodes() {
        // Older favorite buttons carried the user id before the mode
        assert_eq!(
            Token::decode("fav_123456_emt_7"),
            Some(Token::AddFavorite(Mode::BusUrban, StopIndex(7), None))
        );
        assert_eq!(
            Token::decode("unfav_123456_emt_7"),
            Some(Token::RemoveFavorite(Mode::BusUrban, StopIndex(7), None))
        );
        assert_eq!(
            Token::decode("fav_emt_7"),
            Some(Token::AddFavorite(Mode::BusUrban, StopIndex(7), None))
        );
        // A trailing segment that is not a stamp is not mistaken for one
        assert_eq!(
            Token::decode("unfav_emt_7_XYZ"),
            None
        );
    }

    #[test]
    fn malformed_tokens_are_none() {
        for data in [
            "",
            "_",
            "unknown",
            "foo_bar_baz",
            "train_menu",
            "train_menu_tram",
            "line_menu_metro",
            "time_train_metro_1_S",
            "time_bus_emt_x",
            "time_bus_emt_-1",
            "station_menu_metro_1_AB",
            "time_cli__3",
            "drop_fav_emt_123",
            "fav_train_metro_1_S_0",
        ] {
            assert_eq!(Token::decode(data), None, "{data:?} should not decode");
        }
    }

    #[test]
    fn mode_accessor() {
        assert_eq!(Token::MainMenu.mode(), None);
        assert_eq!(
            Token::StationMenu(Mode::Metro, line("1"), letter('S')).mode(),
            Some(Mode::Metro)
        );
    }

    #[test]
    fn deepest_token_fits_payload() {
        let token = Token::TrainTime {
            mode: Mode::CommuterRail,
            line: line("ABCDEFGH"),
            letter: letter('\u{10FFFF}'),
            index: StopIndex(usize::MAX),
        };
        assert!(token.encode().len() <= MAX_TOKEN_LEN);
        let token = Token::AddTrainFavorite {
            mode: Mode::CommuterRail,
            line: line("ABCDEFGH"),
            letter: letter('\u{10FFFF}'),
            index: StopIndex(usize::MAX),
            stamp: stamp("ffff"),
        };
        assert!(token.encode().len() <= MAX_TOKEN_LEN);
    }
}
