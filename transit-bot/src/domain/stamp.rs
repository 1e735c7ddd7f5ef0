//! Short fingerprints that let a token name what it was rendered against.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

fn hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Fingerprint of one catalog generation.
///
/// Tokens that change a user's favorites carry the stamp of the catalog
/// their index came from. A stamp that no longer matches means the index
/// may point at a different stop now.
///
/// # Examples
///
/// ```
/// use transit_bot::domain::Stamp;
///
/// let a = Stamp::of(["EMT_1", "EMT_2"]);
/// assert_eq!(a, Stamp::of(["EMT_1", "EMT_2"]));
/// assert_ne!(a, Stamp::of(["EMT_2"]));
/// assert_eq!(Stamp::parse(&a.to_string()), Some(a));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp(u16);

impl Stamp {
    /// Encoded length in hex digits.
    pub const LEN: usize = 4;

    /// Stamp for stops listed by external id in index order.
    pub fn of<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = DefaultHasher::new();
        for id in ids {
            id.hash(&mut hasher);
        }
        Stamp(hasher.finish() as u16)
    }

    pub fn parse(s: &str) -> Option<Self> {
        if !hex_of_len(s, Self::LEN) {
            return None;
        }
        u16::from_str_radix(s, 16).ok().map(Stamp)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Token-safe key for a persisted favorite, derived from its external id.
///
/// External ids may contain the token delimiter, so tokens that must name a
/// favorite the catalog no longer has carry this key instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FavoriteKey(u32);

impl FavoriteKey {
    pub const LEN: usize = 8;

    pub fn of(external_id: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        external_id.hash(&mut hasher);
        FavoriteKey(hasher.finish() as u32)
    }

    pub fn parse(s: &str) -> Option<Self> {
        if !hex_of_len(s, Self::LEN) {
            return None;
        }
        u32::from_str_radix(s, 16).ok().map(FavoriteKey)
    }
}

impl fmt::Display for FavoriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Longest card number accepted, in digits.
pub const MAX_CARD_DIGITS: usize = 22;

/// Shortest card number accepted, in digits.
pub const MIN_CARD_DIGITS: usize = 6;

/// A transit card number: ASCII digits only, so it can sit in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    /// Parse a typed card number. Surrounding whitespace is trimmed.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let valid = (MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&s.len())
            && s.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| CardNumber(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_depends_on_order_and_content() {
        let ab = Stamp::of(["a", "b"]);
        assert_eq!(ab, Stamp::of(["a", "b"]));
        assert_ne!(ab, Stamp::of(["b", "a"]));
        assert_ne!(ab, Stamp::of(["ab"]));
        assert_eq!(ab.to_string().len(), Stamp::LEN);
    }

    #[test]
    fn stamp_parse_is_strict() {
        assert_eq!(Stamp::parse("00ff").map(|s| s.to_string()).as_deref(), Some("00ff"));
        assert_eq!(Stamp::parse("00FF"), None);
        assert_eq!(Stamp::parse("0ff"), None);
        assert_eq!(Stamp::parse("12345"), None);
        assert_eq!(Stamp::parse("+fff"), None);
    }

    #[test]
    fn favorite_key_is_delimiter_free() {
        let key = FavoriteKey::of("CRTM_par_8_10866");
        let text = key.to_string();
        assert_eq!(text.len(), FavoriteKey::LEN);
        assert!(!text.contains('_'));
        assert_eq!(FavoriteKey::parse(&text), Some(key));
        assert_ne!(key, FavoriteKey::of("CRTM_par_8_10867"));
    }

    #[test]
    fn card_number_rejects_path_tricks() {
        assert_eq!(
            CardNumber::parse(" 0010000000 ").map(|c| c.to_string()).as_deref(),
            Some("0010000000")
        );
        for raw in ["../weather", "1?x=", "0010000000/..", "00100 00000", "-1", "12345", "", "１２３４５６"] {
            assert_eq!(CardNumber::parse(raw), None, "{raw:?} should be rejected");
        }
        assert!(CardNumber::parse(&"9".repeat(MAX_CARD_DIGITS)).is_some());
        assert!(CardNumber::parse(&"9".repeat(MAX_CARD_DIGITS + 1)).is_none());
    }
}
