//! Stop lookup by typed name or public number.
//!
//! Both lookups are pure functions over a catalog snapshot: no I/O, no
//! locking, and results always come back in catalog build order.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::domain::{Mode, StopIndex, normalize};
use crate::token::{Origin, Token};

/// A stop matching a name search, ready to become a button or inline result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopMatch {
    pub index: StopIndex,
    /// Button label; bus stops carry their public code.
    pub display: String,
    pub token: Token,
}

/// Find stops whose name contains every word.
///
/// Each word narrows the previous result (substring match after
/// normalization), so adding words never widens the set. Metro results are
/// deduplicated by name, keeping the first. `origin` selects the token the
/// result leads to: [`Origin::Inline`] for inline results, anything else is
/// treated as a typed command.
pub fn match_by_name<S: AsRef<str>>(catalog: &Catalog, words: &[S], origin: Origin) -> Vec<StopMatch> {
    let needles: Vec<String> = words.iter().map(|w| normalize(w.as_ref())).collect();
    let origin = match origin {
        Origin::Inline => Origin::Inline,
        _ => Origin::Command,
    };
    let mode = catalog.mode();
    let mut seen: HashSet<&str> = HashSet::new();

    catalog
        .stops()
        .filter(|(_, stop)| {
            let haystack = normalize(&stop.name);
            needles.iter().all(|n| haystack.contains(n.as_str()))
        })
        .filter(|(_, stop)| mode != Mode::Metro || seen.insert(stop.name.as_str()))
        .filter_map(|(index, _)| {
            Some(StopMatch {
                index,
                display: catalog.display_name(index)?,
                token: Token::StopTime {
                    mode,
                    index,
                    origin,
                },
            })
        })
        .collect()
}

/// Find the stop with a given public number.
///
/// Bus modes compare against the provider-prefixed id (`EMT_658`), the
/// bike-share compares the bare number. Modes without public numbers never
/// match. First hit in build order wins.
pub fn match_by_number(catalog: &Catalog, number: &str) -> Option<StopIndex> {
    let mode = catalog.mode();
    if !mode.accepts_number() {
        return None;
    }
    let number = number.trim();
    if number.is_empty() {
        return None;
    }
    let wanted = match mode.id_prefix() {
        Some(prefix) => format!("{prefix}{number}"),
        None => number.to_string(),
    };
    catalog
        .stops()
        .find(|(_, stop)| stop.external_id == wanted)
        .map(|(index, _)| index)
}

/// Whether a query looks like a stop number rather than a name.
pub fn is_number(query: &str) -> bool {
    let query = query.trim();
    !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::catalog::{BuildRules, RawStop};
    use proptest::prelude::*;

    const NAMES: [&str; 12] = [
        "Sol",
        "Ópera",
        "Príncipe Pío",
        "Príncipe de Vergara",
        "Plaza de España",
        "Atocha",
        "Atocha Renfe",
        "Puerta del Sol",
        "Alonso Martínez",
        "Núñez de Balboa",
        "Cuatro Caminos",
        "Estación de Aravaca",
    ];

    fn catalog(mode: Mode) -> Catalog {
        let raw: Vec<RawStop> = NAMES
            .iter()
            .enumerate()
            .map(|(i, n)| RawStop::new(*n, format!("EMT_{i}")))
            .collect();
        Catalog::build(mode, &raw, &BuildRules::default())
    }

    fn words() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-zA-ZáéíóúñÁÉÍÓÚÑ ]{0,4}", 0..4)
    }

    proptest! {
        /// Adding a word never adds results
        #[test]
        fn more_words_never_widen(words in words(), extra in "[a-zA-ZáéíóúñÑ]{0,3}") {
            let cat = catalog(Mode::BusUrban);
            let before: HashSet<StopIndex> = match_by_name(&cat, &words, Origin::Command)
                .into_iter()
                .map(|m| m.index)
                .collect();
            let mut longer = words.clone();
            longer.push(extra);
            let after: HashSet<StopIndex> = match_by_name(&cat, &longer, Origin::Command)
                .into_iter()
                .map(|m| m.index)
                .collect();
            prop_assert!(after.is_subset(&before));
        }

        /// Same input, same output, in build order
        #[test]
        fn deterministic_and_ordered(words in words()) {
            let cat = catalog(Mode::Metro);
            let first = match_by_name(&cat, &words, Origin::Command);
            let second = match_by_name(&cat, &words, Origin::Command);
            prop_assert_eq!(&first, &second);
            let indices: Vec<usize> = first.iter().map(|m| m.index.0).collect();
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            prop_assert_eq!(indices, sorted);
        }
    }
}
