// src/checklist/fingerprint.rs

//! Change detection for checklists.
//!
//! A fingerprint is the checklist's `code:grade` pairs sorted by code and
//! joined with `|`, e.g. `101:2|102:1`. Acts keep the fingerprint of the
//! checklist state their current analysis was generated from; the LLM is only
//! called again when the current fingerprint differs.

use std::fmt;

use tracing::{error, warn};

use crate::checklist::{PendingWork, ScoredItem};
use crate::db::ChecklistGateway;

const PAIR_SEPARATOR: char = ':';
const ITEM_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of an item set, independent of input order.
    ///
    /// Returns `None` for an empty set.
    pub fn compute(items: &[ScoredItem]) -> Option<Self> {
        if items.is_empty() {
            return None;
        }

        let mut sorted = items.to_vec();
        sorted.sort_by_key(|item| (item.code, item.grade));

        let joined = sorted
            .iter()
            .map(|item| format!("{}{}{}", item.code, PAIR_SEPARATOR, item.grade))
            .collect::<Vec<_>>()
            .join(&ITEM_SEPARATOR.to_string());

        Some(Self(joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `stored` exists and equals this fingerprint.
    pub fn matches(&self, stored: Option<&str>) -> bool {
        stored == Some(self.0.as_str())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads and writes fingerprints through the cycle's gateway.
///
/// Every failure is logged and collapsed to "no fingerprint" / `false`; none
/// of them is fatal to the cycle.
pub struct FingerprintTracker;

impl FingerprintTracker {
    /// Fingerprint of the checklist as it is stored right now.
    pub async fn current<G>(gateway: &mut G, work: &PendingWork) -> Option<Fingerprint>
    where
        G: ChecklistGateway + ?Sized,
    {
        match gateway.scored_items(&work.table, work.checklist_id).await {
            Ok(items) => Fingerprint::compute(&items),
            Err(e) => {
                error!(
                    checklist_id = work.checklist_id,
                    table = %work.table,
                    "Failed to compute checklist fingerprint: {}", e
                );
                None
            }
        }
    }

    pub async fn fetch_stored<G>(gateway: &mut G, act_id: i64) -> Option<String>
    where
        G: ChecklistGateway + ?Sized,
    {
        match gateway.stored_fingerprint(act_id).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(act_id, "Failed to read stored fingerprint: {}", e);
                None
            }
        }
    }

    /// Store `fingerprint` on the act, or clear it when there is none so a
    /// stale value cannot vouch for a newer analysis.
    pub async fn persist<G>(gateway: &mut G, act_id: i64, fingerprint: Option<&Fingerprint>) -> bool
    where
        G: ChecklistGateway + ?Sized,
    {
        if fingerprint.is_none() {
            warn!(act_id, "No current fingerprint, clearing the stored one");
        }

        match gateway
            .store_fingerprint(act_id, fingerprint.map(Fingerprint::as_str))
            .await
        {
            Ok(0) => {
                warn!(act_id, "Fingerprint not stored: act row not found");
                false
            }
            Ok(_) => true,
            Err(e) => {
                error!(act_id, "Failed to store fingerprint: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(i64, i32)]) -> Vec<ScoredItem> {
        pairs.iter().map(|&(c, g)| ScoredItem::new(c, g)).collect()
    }

    #[test]
    fn format_is_code_grade_pairs_joined_by_pipe() {
        let fp = Fingerprint::compute(&items(&[(101, 2), (102, 1)])).unwrap();
        assert_eq!(fp.as_str(), "101:2|102:1");
    }

    #[test]
    fn same_items_in_any_order_give_same_fingerprint() {
        let a = Fingerprint::compute(&items(&[(101, 2), (102, 1), (7, 0)]));
        let b = Fingerprint::compute(&items(&[(102, 1), (7, 0), (101, 2)]));
        assert_eq!(a, b);
        assert_eq!(a.unwrap().as_str(), "7:0|101:2|102:1");
    }

    #[test]
    fn any_grade_or_membership_change_changes_the_fingerprint() {
        let base = items(&[(101, 2), (102, 1), (103, 3)]);
        let variants = vec![
            items(&[(101, 2), (102, 2), (103, 3)]),
            items(&[(101, 2), (102, 1)]),
            items(&[(101, 2), (102, 1), (103, 3), (104, 0)]),
            items(&[(101, 2), (102, 1), (130, 3)]),
            items(&[(10, 12), (102, 1), (103, 3)]),
            items(&[(1012, 0), (102, 1), (103, 3)]),
        ];

        let base_fp = Fingerprint::compute(&base).unwrap();
        let mut seen = vec![base_fp.clone()];
        for variant in variants {
            let fp = Fingerprint::compute(&variant).unwrap();
            assert!(!seen.contains(&fp), "collision for {variant:?}");
            seen.push(fp);
        }
    }

    #[test]
    fn empty_checklist_has_no_fingerprint() {
        assert!(Fingerprint::compute(&[]).is_none());
    }

    #[test]
    fn matches_requires_a_stored_value() {
        let fp = Fingerprint::compute(&items(&[(101, 2)])).unwrap();
        assert!(fp.matches(Some("101:2")));
        assert!(!fp.matches(Some("101:1")));
        assert!(!fp.matches(None));
    }
}
