use std::collections::{BTreeSet, HashSet};

use crate::ir::PersonId;

use super::person_graph::PersonGraph;

/// Atomic horizontal placement unit: a spouse pair plus unmarried siblings,
/// ordered by person id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyGroup {
    pub members: Vec<PersonId>,
}

/// What a family group is centred under on the row above.
///
/// Ordering is part of the layout contract: keys are placed in ascending
/// order, roots first, then single parents, then couples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParentKey {
    Root,
    Single(PersonId),
    Couple(PersonId, PersonId),
}

impl FamilyGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn min_member(&self) -> PersonId {
        self.members.first().copied().unwrap_or_default()
    }

    /// Spouse pairs whose both partners are members, as (min, max).
    pub fn spouse_pairs(&self, graph: &PersonGraph<'_>) -> Vec<(PersonId, PersonId)> {
        let mut pairs = Vec::new();
        for member in &self.members {
            let Some(spouse) = graph.lookup(*member).and_then(|p| p.spouse_id) else {
                continue;
            };
            if *member < spouse && self.members.contains(&spouse) {
                pairs.push((*member, spouse));
            }
        }
        pairs
    }

    /// Derived from every parent id any member lists: two or more distinct
    /// ids collapse to the (min, max) couple.
    pub fn parent_key(&self, graph: &PersonGraph<'_>) -> ParentKey {
        let parents: BTreeSet<PersonId> = self
            .members
            .iter()
            .filter_map(|member| graph.lookup(*member))
            .flat_map(|person| person.parent_ids.iter().copied())
            .collect();
        match (parents.first(), parents.last()) {
            (Some(first), Some(last)) if first != last => ParentKey::Couple(*first, *last),
            (Some(only), _) => ParentKey::Single(*only),
            _ => ParentKey::Root,
        }
    }
}

/// Partitions one generation row into family groups. `row` is the row's
/// people in display order; every one of them ends up in exactly one group.
pub fn build_family_groups(graph: &PersonGraph<'_>, row: &[PersonId]) -> Vec<FamilyGroup> {
    let on_row: HashSet<PersonId> = row.iter().copied().collect();
    let mut assigned: HashSet<PersonId> = HashSet::with_capacity(row.len());
    let mut groups = Vec::new();

    for &id in row {
        if !assigned.insert(id) {
            continue;
        }
        let mut members = vec![id];

        if let Some(spouse) = graph.lookup(id).and_then(|p| p.spouse_id)
            && on_row.contains(&spouse)
            && assigned.insert(spouse)
        {
            members.push(spouse);
        }

        for sibling in graph.siblings(id) {
            if !on_row.contains(&sibling) || assigned.contains(&sibling) {
                continue;
            }
            let unmarried = graph
                .lookup(sibling)
                .is_some_and(|person| person.spouse_id.is_none());
            if unmarried {
                assigned.insert(sibling);
                members.push(sibling);
            }
        }

        members.sort_unstable();
        groups.push(FamilyGroup { members });
    }
    groups
}
