//! Reconciling saved window descriptors with live windows.
//!
//! Window ids do not survive restarts and titles drift (unread counters,
//! document names), so each saved descriptor is matched through a ladder of
//! [`MatchTier`]s, strongest first:
//!
//! 1. [`Id`](MatchTier::Id) — same window id, when ids come from the
//!    current session.
//! 2. [`Exact`](MatchTier::Exact) — same application and identical title.
//! 3. [`Fuzzy`](MatchTier::Fuzzy) — same application and similar
//!    [normalized](normalize_title) titles.
//! 4. [`Slot`](MatchTier::Slot) — any remaining window of the application.
//!
//! Descriptors are visited in capture order and every live window is handed
//! out at most once, so earlier descriptors win contested windows.  The
//! result depends only on the order of both inputs.

use crate::command::WindowInfo;
use crate::store::WindowDescriptor;
use log::{debug, warn};
use std::fmt;

/// Fuzzy candidates must score strictly above this.
pub const FUZZY_THRESHOLD: f64 = 0.5;

/// Score for one normalized title containing the other.
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Confidence level at which a live window was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchTier {
    Id,
    Exact,
    Fuzzy,
    Slot,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Id => write!(f, "id"),
            MatchTier::Exact => write!(f, "exact"),
            MatchTier::Fuzzy => write!(f, "fuzzy"),
            MatchTier::Slot => write!(f, "slot"),
        }
    }
}

/// Matches per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub id: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub slot: usize,
}

impl TierCounts {
    fn record(&mut self, tier: MatchTier) {
        match tier {
            MatchTier::Id => self.id += 1,
            MatchTier::Exact => self.exact += 1,
            MatchTier::Fuzzy => self.fuzzy += 1,
            MatchTier::Slot => self.slot += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.id + self.exact + self.fuzzy + self.slot
    }
}

/// One descriptor paired with one live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Index into the descriptor slice.
    pub descriptor: usize,
    /// Index into the live window slice.
    pub window: usize,
    pub tier: MatchTier,
}

/// Result of [`match_windows`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// In descriptor order.
    pub assignments: Vec<Assignment>,
    /// Indices of descriptors that found no window.
    pub unmatched: Vec<usize>,
    pub counts: TierCounts,
}

/// Knobs for [`match_windows`].
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Whether saved window ids can be compared with live ones at all.
    /// False when the snapshot comes from another compositor session.
    pub trust_ids: bool,
    /// Lowercase title suffixes removed before fuzzy comparison.
    pub title_suffixes: Vec<String>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            trust_ids: true,
            title_suffixes: crate::config::DEFAULT_TITLE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Assign live windows to saved descriptors.
pub fn match_windows(
    descriptors: &[WindowDescriptor],
    live: &[WindowInfo],
    options: &MatchOptions,
) -> MatchOutcome {
    let mut used = vec![false; live.len()];
    let mut outcome = MatchOutcome::default();
    let normalized_live: Vec<String> = live
        .iter()
        .map(|w| normalize_title(&w.title, &options.title_suffixes))
        .collect();

    for (di, desc) in descriptors.iter().enumerate() {
        let unused = |wi: &usize| !used[*wi];
        let free = |wi: &usize| unused(wi) && live[*wi].app == desc.app;

        let by_id = || {
            let id = desc.id.filter(|_| options.trust_ids)?;
            (0..live.len()).filter(unused).find(|&wi| live[wi].id == id)
        };
        let exact = || (0..live.len()).filter(free).find(|&wi| live[wi].title == desc.title);
        let fuzzy = || {
            let wanted = normalize_title(&desc.title, &options.title_suffixes);
            let mut best: Option<(usize, f64)> = None;
            for wi in (0..live.len()).filter(free) {
                let score = similarity(&wanted, &normalized_live[wi]);
                if score > FUZZY_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                    best = Some((wi, score));
                }
            }
            best.map(|(wi, _)| wi)
        };
        let slot = || (0..live.len()).find(free);

        let hit = by_id()
            .map(|wi| (wi, MatchTier::Id))
            .or_else(|| exact().map(|wi| (wi, MatchTier::Exact)))
            .or_else(|| fuzzy().map(|wi| (wi, MatchTier::Fuzzy)))
            .or_else(|| slot().map(|wi| (wi, MatchTier::Slot)));

        match hit {
            Some((wi, tier)) => {
                debug!(
                    "{} {:?} -> window {:#x} {:?} ({})",
                    desc.app, desc.title, live[wi].id, live[wi].title, tier
                );
                used[wi] = true;
                outcome.counts.record(tier);
                outcome.assignments.push(Assignment {
                    descriptor: di,
                    window: wi,
                    tier,
                });
            }
            None => {
                warn!("no open window for {} {:?}", desc.app, desc.title);
                outcome.unmatched.push(di);
            }
        }
    }
    outcome
}

/// Reduce a title to the part that survives tab switches and badges.
///
/// Lowercases, removes one known application suffix, removes counters such
/// as `(3)` or `[12]`, drops punctuation and control characters and
/// collapses whitespace.
pub fn normalize_title(title: &str, suffixes: &[String]) -> String {
    let mut s = title.to_lowercase();
    if let Some(suffix) = suffixes
        .iter()
        .map(|suffix| suffix.to_lowercase())
        .find(|suffix| !suffix.is_empty() && s.ends_with(suffix.as_str()))
    {
        s.truncate(s.len() - suffix.len());
    }
    let s = strip_counters(&s);
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove bracketed digit groups: `"inbox (3)"` → `"inbox "`.
fn strip_counters(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find(['(', '[']) {
        let close = if rest[pos..].starts_with('(') { ')' } else { ']' };
        let inner_start = pos + 1;
        match rest[inner_start..].find(close) {
            Some(len)
                if len > 0
                    && rest[inner_start..inner_start + len]
                        .chars()
                        .all(|c| c.is_ascii_digit() || c == '+') =>
            {
                out.push_str(&rest[..pos]);
                rest = &rest[inner_start + len + 1..];
            }
            _ => {
                out.push_str(&rest[..inner_start]);
                rest = &rest[inner_start..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Coarse similarity of two normalized titles.
///
/// [`CONTAINMENT_SCORE`] if the shorter one occurs in the longer one,
/// otherwise `0.0`.  Empty strings never match.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if !short.is_empty() && long.contains(short) {
        CONTAINMENT_SCORE
    } else {
        0.0
    }
}
