// src/diff/ranking.rs
//! The named multi-key comparator ordering trial mappers during
//! signature-change candidate selection. Keys are explicit and ordered so
//! each tie-break is independently testable.

use crate::mapping::BodyMapper;
use crate::model::text::normalized_distance;
use std::cmp::Ordering;

/// Ranking keys for one trial mapper. Smaller ranks are better; `cmp`
/// applies the keys in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperRank {
    /// More exact matches first.
    pub exact_matches: usize,
    /// More mappings first.
    pub total_mappings: usize,
    /// Fewer unexplained statements first.
    pub non_mapped: usize,
    /// Closer operation names first (normalized distance, per mille).
    pub name_distance_permille: u32,
    /// Smaller declaration-position distance first.
    pub position_distance: usize,
    /// Deterministic last resort: candidate generation order.
    pub generation_order: usize,
}

impl MapperRank {
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_mapper(
        mapper: &BodyMapper<'_>,
        position_distance: usize,
        generation_order: usize,
    ) -> Self {
        let name1 = &mapper.container1().name;
        let name2 = &mapper.container2().name;
        Self {
            exact_matches: mapper.exact_matches().len(),
            total_mappings: mapper.mappings_without_blocks(),
            non_mapped: mapper.non_mapped_elements_t1() + mapper.non_mapped_elements_t2(),
            name_distance_permille: (normalized_distance(name1, name2) * 1000.0).round() as u32,
            position_distance,
            generation_order,
        }
    }
}

impl Ord for MapperRank {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .exact_matches
            .cmp(&self.exact_matches)
            .then(other.total_mappings.cmp(&self.total_mappings))
            .then(self.non_mapped.cmp(&other.non_mapped))
            .then(self.name_distance_permille.cmp(&other.name_distance_permille))
            .then(self.position_distance.cmp(&other.position_distance))
            .then(self.generation_order.cmp(&other.generation_order))
    }
}

impl PartialOrd for MapperRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(
        exact: usize,
        total: usize,
        non_mapped: usize,
        name: u32,
        position: usize,
        order: usize,
    ) -> MapperRank {
        MapperRank {
            exact_matches: exact,
            total_mappings: total,
            non_mapped,
            name_distance_permille: name,
            position_distance: position,
            generation_order: order,
        }
    }

    #[test]
    fn exact_matches_dominate() {
        assert!(rank(3, 3, 9, 900, 9, 1) < rank(2, 9, 0, 0, 0, 0));
    }

    #[test]
    fn total_mappings_break_exact_ties() {
        assert!(rank(2, 5, 0, 0, 0, 1) < rank(2, 4, 0, 0, 0, 0));
    }

    #[test]
    fn fewer_non_mapped_wins() {
        assert!(rank(2, 4, 1, 500, 5, 1) < rank(2, 4, 3, 0, 0, 0));
    }

    #[test]
    fn name_distance_breaks_structural_ties() {
        assert!(rank(2, 4, 1, 100, 9, 1) < rank(2, 4, 1, 200, 0, 0));
    }

    #[test]
    fn position_then_generation_order_are_last() {
        assert!(rank(2, 4, 1, 100, 2, 9) < rank(2, 4, 1, 100, 3, 0));
        assert!(rank(2, 4, 1, 100, 2, 0) < rank(2, 4, 1, 100, 2, 1));
    }
}
