use std::collections::{BTreeSet, HashMap};

use crate::error::CyclicRelationshipError;
use crate::ir::{FamilySnapshot, Person, PersonId};

/// Read-only view over a snapshot with generation ranks computed up front.
#[derive(Debug, Clone)]
pub struct PersonGraph<'a> {
    snapshot: &'a FamilySnapshot,
    generations: HashMap<PersonId, u32>,
}

impl<'a> PersonGraph<'a> {
    pub fn build(snapshot: &'a FamilySnapshot) -> Result<Self, CyclicRelationshipError> {
        let mut memo = HashMap::with_capacity(snapshot.len());
        let mut chain = Vec::new();
        for person in snapshot.people() {
            rank_generation(snapshot, person.id, &mut memo, &mut chain)?;
        }
        Ok(Self {
            snapshot,
            generations: memo,
        })
    }

    pub fn snapshot(&self) -> &'a FamilySnapshot {
        self.snapshot
    }

    pub fn lookup(&self, id: PersonId) -> Option<&'a Person> {
        self.snapshot.get(id)
    }

    /// Generation rank; ids outside the snapshot rank as roots.
    pub fn generation(&self, id: PersonId) -> u32 {
        self.generations.get(&id).copied().unwrap_or(1)
    }

    pub fn spouse_of(&self, id: PersonId) -> Option<&'a Person> {
        self.lookup(id)?.spouse_id.and_then(|spouse| self.lookup(spouse))
    }

    /// Everyone listed as a child of any of `id`'s parents, minus `id`.
    pub fn siblings(&self, id: PersonId) -> BTreeSet<PersonId> {
        let Some(person) = self.lookup(id) else {
            return BTreeSet::new();
        };
        person
            .parent_ids
            .iter()
            .filter_map(|parent| self.lookup(*parent))
            .flat_map(|parent| parent.children_ids.iter().copied())
            .filter(|child| *child != id)
            .collect()
    }

    pub fn shares_child(&self, a: PersonId, b: PersonId) -> bool {
        match (self.lookup(a), self.lookup(b)) {
            (Some(a), Some(b)) => a.children_ids.iter().any(|child| b.has_child(*child)),
            _ => false,
        }
    }
}

fn rank_generation(
    snapshot: &FamilySnapshot,
    id: PersonId,
    memo: &mut HashMap<PersonId, u32>,
    chain: &mut Vec<PersonId>,
) -> Result<u32, CyclicRelationshipError> {
    if let Some(generation) = memo.get(&id) {
        return Ok(*generation);
    }
    let Some(person) = snapshot.get(id) else {
        return Ok(1);
    };
    if let Some(start) = chain.iter().position(|visited| *visited == id) {
        let mut cycle = chain[start..].to_vec();
        cycle.push(id);
        return Err(CyclicRelationshipError { chain: cycle });
    }

    // A parentless person married into the tree sits on the spouse's row.
    let ancestors: &[PersonId] = if person.has_parents() {
        &person.parent_ids
    } else {
        match person.spouse_id.and_then(|spouse| snapshot.get(spouse)) {
            Some(spouse) => &spouse.parent_ids,
            None => &[],
        }
    };

    chain.push(id);
    let mut generation = 1;
    if !ancestors.is_empty() {
        let mut deepest = 0;
        for ancestor in ancestors {
            deepest = deepest.max(rank_generation(snapshot, *ancestor, memo, chain)?);
        }
        generation = deepest + 1;
    }
    chain.pop();

    memo.insert(id, generation);
    Ok(generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn person(id: PersonId, parents: &[PersonId], spouse: Option<PersonId>, children: &[PersonId]) -> Person {
        let mut person = Person::new(id, &format!("P{id}"), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        person.parent_ids = parents.to_vec();
        person.spouse_id = spouse;
        person.children_ids = children.to_vec();
        person
    }

    fn snapshot(people: Vec<Person>) -> FamilySnapshot {
        FamilySnapshot::new(people).expect("valid snapshot")
    }

    #[test]
    fn ranks_three_generations() {
        let snap = snapshot(vec![
            person(5, &[3, 4], None, &[]),
            person(1, &[], Some(2), &[3]),
            person(2, &[], Some(1), &[3]),
            person(3, &[1, 2], Some(4), &[5]),
            person(4, &[], Some(3), &[5]),
        ]);
        let graph = PersonGraph::build(&snap).expect("acyclic");
        assert_eq!(graph.generation(1), 1);
        assert_eq!(graph.generation(2), 1);
        assert_eq!(graph.generation(3), 2);
        // Married in without parents of their own.
        assert_eq!(graph.generation(4), 2);
        assert_eq!(graph.generation(5), 3);
        assert_eq!(graph.generation(99), 1);
    }

    #[test]
    fn generation_uses_deepest_parent() {
        let snap = snapshot(vec![
            person(1, &[], None, &[2]),
            person(2, &[1], None, &[4]),
            person(3, &[], None, &[4]),
            person(4, &[2, 3], None, &[]),
        ]);
        let graph = PersonGraph::build(&snap).expect("acyclic");
        assert_eq!(graph.generation(4), 3);
    }

    #[test]
    fn detects_parent_cycles() {
        let snap = snapshot(vec![
            person(1, &[3], None, &[2]),
            person(2, &[1], None, &[3]),
            person(3, &[2], None, &[1]),
        ]);
        let err = PersonGraph::build(&snap).unwrap_err();
        assert_eq!(err.chain, vec![1, 3, 2, 1]);
    }

    #[test]
    fn siblings_union_both_parents() {
        let snap = snapshot(vec![
            person(1, &[], Some(2), &[10, 11]),
            person(2, &[], Some(1), &[10, 11, 12]),
            person(10, &[1, 2], None, &[]),
            person(11, &[1, 2], None, &[]),
            person(12, &[2], None, &[]),
        ]);
        let graph = PersonGraph::build(&snap).expect("acyclic");
        assert_eq!(graph.siblings(10), BTreeSet::from([11, 12]));
        assert_eq!(graph.siblings(12), BTreeSet::from([10, 11]));
        assert!(graph.siblings(1).is_empty());
        assert!(graph.shares_child(1, 2));
    }
}
