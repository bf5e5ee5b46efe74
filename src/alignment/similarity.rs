use std::collections::{HashMap, HashSet};

use crate::alignment::normalize::normalize;
use crate::config::AssessmentConfig;

/// Groups of phonetically close symbols used for partial substitution credit.
///
/// Group members are normalized on construction so the table speaks the same
/// canonical alphabet as the aligned strings. A symbol may belong to several
/// groups; two symbols are similar when they share at least one.
#[derive(Debug, Clone, Default)]
pub struct SimilarityTable {
    groups_by_symbol: HashMap<char, Vec<usize>>,
    group_count: usize,
}

impl SimilarityTable {
    pub fn new<G, S>(groups: G) -> Self
    where
        G: IntoIterator,
        G::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups_by_symbol: HashMap<char, Vec<usize>> = HashMap::new();
        let mut group_count = 0;

        for group in groups {
            let mut members = HashSet::new();
            for raw in group {
                let raw = raw.as_ref();
                match normalize(raw).symbols() {
                    [symbol] => {
                        members.insert(*symbol);
                    }
                    other => tracing::debug!(
                        member = raw,
                        normalized_len = other.len(),
                        "similarity: skipping member that is not a single canonical symbol"
                    ),
                }
            }
            if members.len() < 2 {
                tracing::debug!(
                    members = members.len(),
                    "similarity: skipping group with fewer than two distinct symbols"
                );
                continue;
            }
            for symbol in members {
                groups_by_symbol.entry(symbol).or_default().push(group_count);
            }
            group_count += 1;
        }

        Self {
            groups_by_symbol,
            group_count,
        }
    }

    pub fn from_config(config: &AssessmentConfig) -> Self {
        Self::new(&config.similarity_groups)
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// True when `a` and `b` are distinct symbols sharing a group.
    pub fn are_similar(&self, a: char, b: char) -> bool {
        if a == b {
            return false;
        }
        let (Some(ga), Some(gb)) = (self.groups_by_symbol.get(&a), self.groups_by_symbol.get(&b))
        else {
            return false;
        };
        ga.iter().any(|g| gb.contains(g))
    }
}
