//! Domain types for the transit bot.
//!
//! Values that travel inside callback tokens (modes, lines, buckets) are
//! validated at construction, so code that receives them can encode them
//! without further checks.

mod line;
mod mode;
mod stamp;
mod text;

pub use line::{AZ, Bucket, DELIMITER, InvalidArgument, LineId, LineSelector, MAX_LINE_LEN, StopIndex};
pub use mode::{InvalidMode, Mode};
pub use stamp::{CardNumber, FavoriteKey, MAX_CARD_DIGITS, MIN_CARD_DIGITS, Stamp};
pub use text::{keyword, normalize};

/// Chat user identifier as assigned by the delivery layer.
pub type UserId = i64;
