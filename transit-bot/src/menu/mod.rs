//! Menu state machine.
//!
//! ```text
//! Main ─┬─ Weather
//!       ├─ Card
//!       ├─ TrainMode ── LineSelect ── StationBucket ── StopTime
//!       ├─ BusMode (typed search only)
//!       └─ Favorites ─┬─ StopTime (favorite)
//!                     └─ RenameTarget
//! ```
//!
//! Every transition is a button carrying a [`Token`](crate::token::Token).

mod navigator;
mod screen;
mod sort;

pub use navigator::{
    CARD_HELP, Leaf, NOT_FAVORITE, Navigator, RENAME_PROMPT, STORE_FAILED, command_examples,
};
pub use screen::{Button, KEYBOARD_WIDTH, Screen};
pub use sort::{metro_line_order, rail_line_order, sort_buckets, sort_lines, sort_stations};
