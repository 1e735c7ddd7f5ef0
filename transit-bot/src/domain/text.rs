//! Text normalization for name matching.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize a name for comparison.
///
/// Compatibility-decomposes (NFKD), drops combining marks and uppercases,
/// so "príncipe", "Príncipe" and "PRINCIPE" all compare equal.
pub fn normalize(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Lowercase ASCII form of a transport keyword ("Cercanías" → "cercanias").
pub fn keyword(s: &str) -> String {
    normalize(s).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_uppercases() {
        assert_eq!(normalize("príncipe"), "PRINCIPE");
        assert_eq!(normalize("Príncipe Pío"), "PRINCIPE PIO");
        assert_eq!(normalize("Ñ"), "N");
        assert_eq!(normalize("Sol"), "SOL");
    }

    #[test]
    fn accents_and_case_are_equivalent() {
        assert_eq!(normalize("príncipe"), normalize("PRINCIPE"));
    }

    #[test]
    fn keyword_lowercases() {
        assert_eq!(keyword("Cercanías"), "cercanias");
        assert_eq!(keyword("METRO"), "metro");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Normalizing twice is the same as normalizing once
        #[test]
        fn idempotent(s in "[a-zA-Z0-9 áéíóúüñÁÉÍÓÚÜÑçÇàèìòùâêîôû'.-]{0,24}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Latin letters with acute accents normalize to the bare letter
        #[test]
        fn acute_accents_removed(s in "[áéíóúÁÉÍÓÚa-zA-Z ]{0,16}") {
            let n = normalize(&s);
            prop_assert!(n.chars().all(|c| c.is_ascii_uppercase() || c == ' '));
        }
    }
}
