//! Immutable per-mode catalog and its one-pass builder.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::domain::{Bucket, LineId, LineSelector, Mode, Stamp, StopIndex};

use super::raw::{RawStop, non_empty};

/// One logical stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub name: String,
    /// Upstream key; favorites are persisted by this.
    pub external_id: String,
    /// Key for live queries. Equal to `external_id` except for bike-share.
    pub live_id: String,
    pub lines: Vec<LineId>,
    /// `None` when the first character cannot travel in a token.
    pub bucket: Option<Bucket>,
}

/// Browsing and lookup index for one mode.
///
/// Built once, never mutated; a refresh builds a new one and swaps it in
/// through the registry.
#[derive(Debug, Clone)]
pub struct Catalog {
    mode: Mode,
    stops: Vec<Stop>,
    by_id: HashMap<String, StopIndex>,
    lines: HashMap<LineId, HashMap<Bucket, Vec<StopIndex>>>,
    letters: HashMap<Bucket, Vec<StopIndex>>,
    stamp: Stamp,
}

/// Per-mode build options.
#[derive(Debug, Clone, Default)]
pub struct BuildRules {
    /// Lines hidden from line browsing. Their stops stay searchable.
    pub banned_lines: HashSet<LineId>,
}

impl BuildRules {
    pub fn with_banned<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned_lines: lines
                .into_iter()
                .filter_map(|l| LineId::parse(l.as_ref()).ok())
                .collect(),
        }
    }
}

impl Catalog {
    /// An empty catalog, used before the first successful load.
    pub fn empty(mode: Mode) -> Self {
        Self {
            mode,
            stops: Vec::new(),
            by_id: HashMap::new(),
            lines: HashMap::new(),
            letters: HashMap::new(),
            stamp: Stamp::of(std::iter::empty()),
        }
    }

    /// Build a catalog from raw records in provider order.
    ///
    /// Records missing a name or id are dropped. Later records repeating an
    /// id already seen are dropped too. Metro records are first collapsed to
    /// one logical station per name.
    pub fn build(mode: Mode, raw: &[RawStop], rules: &BuildRules) -> Self {
        let merged;
        let records: &[RawStop] = if mode == Mode::Metro {
            merged = collapse_metro(raw);
            &merged
        } else {
            raw
        };

        let mut catalog = Catalog::empty(mode);
        let mut dropped = 0usize;

        for record in records {
            let Some(stop) = to_stop(mode, record) else {
                dropped += 1;
                trace!(mode = %mode, ?record, "dropping incomplete record");
                continue;
            };
            if catalog.by_id.contains_key(&stop.external_id) {
                dropped += 1;
                trace!(mode = %mode, id = %stop.external_id, "dropping duplicate id");
                continue;
            }
            catalog.push(stop, rules);
        }
        catalog.stamp = Stamp::of(catalog.stops.iter().map(|s| s.external_id.as_str()));

        debug!(
            mode = %mode,
            stops = catalog.stops.len(),
            dropped,
            lines = catalog.lines.len(),
            "built catalog"
        );
        catalog
    }

    fn push(&mut self, stop: Stop, rules: &BuildRules) {
        let index = StopIndex(self.stops.len());
        self.by_id.insert(stop.external_id.clone(), index);

        if let Some(bucket) = stop.bucket {
            self.letters.entry(bucket).or_default().push(index);
            if self.mode.is_line_aware() {
                for line in &stop.lines {
                    if rules.banned_lines.contains(line) {
                        continue;
                    }
                    self.lines
                        .entry(line.clone())
                        .or_default()
                        .entry(bucket)
                        .or_default()
                        .push(index);
                }
            }
        }

        self.stops.push(stop);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fingerprint of this generation's index-to-stop mapping.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop(&self, index: StopIndex) -> Option<&Stop> {
        self.stops.get(index.0)
    }

    /// Stops in build order with their indices.
    pub fn stops(&self) -> impl Iterator<Item = (StopIndex, &Stop)> {
        self.stops.iter().enumerate().map(|(i, s)| (StopIndex(i), s))
    }

    /// Current index of an external id.
    pub fn index_of(&self, external_id: &str) -> Option<StopIndex> {
        self.by_id.get(external_id).copied()
    }

    /// Browsable lines, unordered.
    pub fn lines(&self) -> impl Iterator<Item = &LineId> {
        self.lines.keys()
    }

    /// Letter buckets available under a line selector, unordered.
    pub fn buckets(&self, selector: &LineSelector) -> Option<Vec<Bucket>> {
        match selector {
            LineSelector::AllStations => Some(self.letters.keys().copied().collect()),
            LineSelector::Line(line) => self.lines.get(line).map(|b| b.keys().copied().collect()),
        }
    }

    /// Stops under a line selector and bucket, in build order.
    pub fn bucket_stops(&self, selector: &LineSelector, bucket: Bucket) -> Option<&[StopIndex]> {
        let buckets = match selector {
            LineSelector::AllStations => &self.letters,
            LineSelector::Line(line) => self.lines.get(line)?,
        };
        buckets.get(&bucket).map(Vec::as_slice)
    }

    /// Name as shown on buttons: bus stops carry their public code.
    pub fn display_name(&self, index: StopIndex) -> Option<String> {
        let stop = self.stop(index)?;
        Some(if self.mode.is_bus() {
            format!("{} ({})", stop.name, self.mode.public_code(&stop.external_id))
        } else {
            stop.name.clone()
        })
    }
}

fn to_stop(mode: Mode, record: &RawStop) -> Option<Stop> {
    let name = record.clean_name()?;
    let external_id = non_empty(record.id.as_deref())?;
    let live_id = non_empty(record.live_id.as_deref()).unwrap_or(external_id);

    let mut lines: Vec<LineId> = Vec::with_capacity(record.lines.len());
    for raw in &record.lines {
        match LineId::parse(raw) {
            Ok(line) if !lines.contains(&line) => lines.push(line),
            Ok(_) => {}
            Err(e) => trace!(mode = %mode, name, error = %e, "skipping line"),
        }
    }

    Some(Stop {
        name: name.to_string(),
        external_id: external_id.to_string(),
        live_id: live_id.to_string(),
        lines,
        bucket: Bucket::of(name),
    })
}

/// Accumulated ids and lines of every platform record sharing a name.
#[derive(Default)]
struct MetroGroup {
    name: String,
    matrix_id: Option<String>,
    web_id: Option<String>,
    occupancy_id: Option<String>,
    id: Option<String>,
    lines: Vec<String>,
}

impl MetroGroup {
    /// Canonical id: pairing id, else web id, else occupancy id.
    fn canonical_id(&self) -> Option<String> {
        self.matrix_id
            .clone()
            .or_else(|| self.web_id.clone())
            .or_else(|| self.occupancy_id.clone())
            .or_else(|| self.id.clone())
    }
}

/// Collapse platform/direction records into one record per station name.
///
/// Each group sits at the position of its first record; lines are the union
/// across the group in first-seen order.
fn collapse_metro(raw: &[RawStop]) -> Vec<RawStop> {
    let mut order: Vec<MetroGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut nameless = 0usize;

    for record in raw {
        let Some(name) = record.clean_name() else {
            nameless += 1;
            continue;
        };
        let pos = *positions.entry(name.to_string()).or_insert_with(|| {
            order.push(MetroGroup {
                name: name.to_string(),
                ..MetroGroup::default()
            });
            order.len() - 1
        });
        let group = &mut order[pos];

        fill(&mut group.matrix_id, record.matrix_id.as_deref());
        fill(&mut group.web_id, record.web_id.as_deref());
        fill(&mut group.occupancy_id, record.occupancy_id.as_deref());
        fill(&mut group.id, record.id.as_deref());
        for line in &record.lines {
            if !group.lines.contains(line) {
                group.lines.push(line.clone());
            }
        }
    }

    if nameless > 0 {
        trace!(nameless, "metro records without a name");
    }

    order
        .into_iter()
        .map(|group| RawStop {
            id: group.canonical_id(),
            name: Some(group.name),
            lines: group.lines,
            ..RawStop::default()
        })
        .collect()
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none()
        && let Some(v) = non_empty(value)
    {
        *slot = Some(v.to_string());
    }
}
