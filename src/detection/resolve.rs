// src/detection/resolve.rs
//! Duplicate resolution. After all extract/inline candidates for a class
//! pair are discovered, several mappers (a parent and its children) may
//! claim the same fragment. Exactly one claim wins, chosen by a fixed
//! priority chain; losers return to their mapper's leftover pools. Runs
//! once per class pair, never interleaved with discovery.

use crate::mapping::BodyMapper;
use crate::model::FragmentId;
use crate::refactoring::MappingEvidence;
use std::collections::BTreeMap;

/// Which mapper inside a class diff a claim belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MapperPath {
    pub mapper: usize,
    /// Index into the parent's child-mapper list, if nested.
    pub child: Option<usize>,
}

#[derive(Debug, Clone)]
struct Claim {
    path: MapperPath,
    fragment1: FragmentId,
    fragment2: FragmentId,
    /// Routed through a confirmed extracted/inlined call.
    through_accepted_call: bool,
    /// The fragment's structural parent is mapped in the same mapper.
    parent_mapped: bool,
    /// Exact leaf or a composite whose child sequences are identical.
    identical_content: bool,
    edit_distance: usize,
    distinct_replacement_kinds: usize,
    order: usize,
}

impl Claim {
    /// Lower sorts first; the first claim in a group wins.
    fn priority(&self) -> (u8, u8, u8, usize, usize, usize) {
        (
            u8::from(!self.through_accepted_call),
            u8::from(!self.parent_mapped),
            u8::from(!self.identical_content),
            self.edit_distance,
            self.distinct_replacement_kinds,
            self.order,
        )
    }
}

/// Resolves all shared-fragment conflicts inside one class diff's mapper
/// collection. Returns evidence snapshots of the evicted mappings so
/// refactorings emitted before resolution can be re-validated.
pub fn resolve_duplicates(mappers: &mut Vec<BodyMapper<'_>>) -> Vec<MappingEvidence> {
    let claims = collect_claims(mappers);

    // group by (owning container, fragment) on each side
    let mut by_fragment1: BTreeMap<(String, FragmentId), Vec<Claim>> = BTreeMap::new();
    let mut by_fragment2: BTreeMap<(String, FragmentId), Vec<Claim>> = BTreeMap::new();
    for claim in &claims {
        let (key1, key2) = claim_keys(mappers, claim);
        by_fragment1.entry(key1).or_default().push(claim.clone());
        by_fragment2.entry(key2).or_default().push(claim.clone());
    }

    let mut evictions: Vec<(MapperPath, FragmentId, FragmentId)> = Vec::new();
    for group in by_fragment1.values().chain(by_fragment2.values()) {
        if group.len() < 2 {
            continue;
        }
        let mut ranked = group.clone();
        ranked.sort_by_key(Claim::priority);
        for loser in &ranked[1..] {
            let record = (loser.path, loser.fragment1, loser.fragment2);
            if !evictions.contains(&record) {
                evictions.push(record);
            }
        }
    }

    let mut evicted = Vec::new();
    for (path, fragment1, fragment2) in evictions {
        let mapper = match path.child {
            None => &mut mappers[path.mapper],
            Some(child) => &mut mappers[path.mapper].child_mappers_mut()[child],
        };
        let snapshot = mapper
            .mappings()
            .iter()
            .find(|m| m.fragment1 == fragment1 && m.fragment2 == fragment2)
            .map(MappingEvidence::from_mapping);
        if let Some(snapshot) = snapshot {
            evicted.push(snapshot);
        }
        mapper.evict_pair(fragment1, fragment2);
    }
    evicted
}

fn collect_claims(mappers: &[BodyMapper<'_>]) -> Vec<Claim> {
    let mut claims = Vec::new();
    let mut order = 0usize;
    for (mapper_index, mapper) in mappers.iter().enumerate() {
        collect_from_mapper(
            mapper,
            MapperPath { mapper: mapper_index, child: None },
            &mut order,
            &mut claims,
        );
        for (child_index, child) in mapper.child_mappers().iter().enumerate() {
            collect_from_mapper(
                child,
                MapperPath { mapper: mapper_index, child: Some(child_index) },
                &mut order,
                &mut claims,
            );
        }
    }
    claims
}

fn collect_from_mapper(
    mapper: &BodyMapper<'_>,
    path: MapperPath,
    order: &mut usize,
    claims: &mut Vec<Claim>,
) {
    let through_accepted_call = path.child.is_some();
    for mapping in mapper.mappings() {
        let parent_mapped = structural_parent_mapped(mapper, mapping.fragment1, mapping.fragment2);
        let identical_content = if mapping.composite {
            identical_child_sequences(mapper, mapping.fragment1, mapping.fragment2)
        } else {
            mapping.is_exact()
        };
        claims.push(Claim {
            path,
            fragment1: mapping.fragment1,
            fragment2: mapping.fragment2,
            through_accepted_call,
            parent_mapped,
            identical_content,
            edit_distance: mapping.edit_distance,
            distinct_replacement_kinds: mapping.distinct_replacement_kinds(),
            order: *order,
        });
        *order += 1;
    }
}

fn claim_keys(
    mappers: &[BodyMapper<'_>],
    claim: &Claim,
) -> ((String, FragmentId), (String, FragmentId)) {
    let mapper = match claim.path.child {
        None => &mappers[claim.path.mapper],
        Some(child) => &mappers[claim.path.mapper].child_mappers()[child],
    };
    (
        (mapper.container1().key(), claim.fragment1),
        (mapper.container2().key(), claim.fragment2),
    )
}

fn structural_parent_mapped(
    mapper: &BodyMapper<'_>,
    fragment1: FragmentId,
    fragment2: FragmentId,
) -> bool {
    let (Some(body1), Some(body2)) = (mapper.body1(), mapper.body2()) else {
        return false;
    };
    let parent1 = body1.fragment(fragment1).parent;
    let parent2 = body2.fragment(fragment2).parent;
    let (Some(parent1), Some(parent2)) = (parent1, parent2) else {
        return false;
    };
    mapper
        .mappings()
        .iter()
        .any(|m| m.fragment1 == parent1 && m.fragment2 == parent2)
}

fn identical_child_sequences(
    mapper: &BodyMapper<'_>,
    fragment1: FragmentId,
    fragment2: FragmentId,
) -> bool {
    let (Some(body1), Some(body2)) = (mapper.body1(), mapper.body2()) else {
        return false;
    };
    let texts1: Vec<&str> = body1
        .fragment(fragment1)
        .children
        .iter()
        .map(|id| body1.fragment(*id).text.as_str())
        .collect();
    let texts2: Vec<&str> = body2
        .fragment(fragment2)
        .children
        .iter()
        .map(|id| body2.fragment(*id).text.as_str())
        .collect();
    !texts1.is_empty() && texts1 == texts2
}
