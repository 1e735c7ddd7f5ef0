//! Display orderings for menu buttons.

use std::cmp::Ordering;

use crate::domain::{Bucket, LineId, Mode, StopIndex, normalize};

/// Metro lines: numeric lines first in numeric order, then the rest
/// alphabetically (`1, 2, 10, R`).
pub fn metro_line_order(a: &LineId, b: &LineId) -> Ordering {
    let key = |l: &LineId| l.as_str().parse::<u64>().ok();
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Numeric part following the letter prefix: `C4a` → 4, `C10` → 10.
fn rail_number(line: &str) -> Option<u64> {
    let rest = line.trim_start_matches(|c: char| c.is_alphabetic());
    let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())];
    digits.parse().ok()
}

/// Commuter lines: by the number after the letter prefix, ties and
/// unnumbered lines by name (`C1, C2, C4a, C4b, C10`).
pub fn rail_line_order(a: &LineId, b: &LineId) -> Ordering {
    match (rail_number(a.as_str()), rail_number(b.as_str())) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort a mode's browsable lines for display.
pub fn sort_lines(mode: Mode, lines: &mut [LineId]) {
    if mode == Mode::CommuterRail {
        lines.sort_by(rail_line_order);
    } else {
        lines.sort_by(metro_line_order);
    }
}

/// Letter buckets by normalized character, so `Ó` sits with `O`.
pub fn sort_buckets(buckets: &mut [Bucket]) {
    buckets.sort_by_cached_key(|b| (normalize(&b.to_string()), *b));
}

/// Stations for a bucket, ordered by display name with repeated names
/// collapsed to their first index.
pub fn sort_stations(mut stations: Vec<(String, StopIndex)>) -> Vec<(String, StopIndex)> {
    let mut seen = std::collections::HashSet::new();
    stations.retain(|(name, _)| seen.insert(name.clone()));
    stations.sort_by_cached_key(|(name, index)| (normalize(name), name.clone(), *index));
    stations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(ids: &[&str]) -> Vec<LineId> {
        ids.iter().map(|s| LineId::parse(s).unwrap()).collect()
    }

    fn strs(lines: &[LineId]) -> Vec<&str> {
        lines.iter().map(LineId::as_str).collect()
    }

    #[test]
    fn metro_numeric_first() {
        let mut l = lines(&["R", "10", "2", "1", "12", "6"]);
        sort_lines(Mode::Metro, &mut l);
        assert_eq!(strs(&l), vec!["1", "2", "6", "10", "12", "R"]);
    }

    #[test]
    fn rail_by_suffix() {
        let mut l = lines(&["C10", "C4b", "C1", "C4a", "C2", "T"]);
        sort_lines(Mode::CommuterRail, &mut l);
        assert_eq!(strs(&l), vec!["C1", "C2", "C4a", "C4b", "C10", "T"]);
    }

    #[test]
    fn buckets_by_normalized_char() {
        let mut b: Vec<Bucket> = ['P', 'Ó', 'A', 'O', 'Á']
            .into_iter()
            .map(|c| Bucket::new(c).unwrap())
            .collect();
        sort_buckets(&mut b);
        let chars: String = b.iter().map(|b| b.as_char()).collect();
        assert_eq!(chars, "AÁOÓP");
    }

    #[test]
    fn stations_sorted_and_deduplicated() {
        let sorted = sort_stations(vec![
            ("Sol".into(), StopIndex(4)),
            ("Ópera".into(), StopIndex(1)),
            ("Oporto".into(), StopIndex(2)),
            ("Sol".into(), StopIndex(9)),
        ]);
        let names: Vec<(&str, usize)> = sorted.iter().map(|(n, i)| (n.as_str(), i.0)).collect();
        assert_eq!(names, vec![("Ópera", 1), ("Oporto", 2), ("Sol", 4)]);
    }
}
