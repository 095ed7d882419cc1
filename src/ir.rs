use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::InputValidationError;

pub type PersonId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub parent_ids: Vec<PersonId>,
    pub spouse_id: Option<PersonId>,
    pub children_ids: Vec<PersonId>,
}

impl Person {
    pub fn new(id: PersonId, name: &str, birth_date: NaiveDate) -> Self {
        Self {
            id,
            name: name.to_string(),
            birth_date,
            parent_ids: Vec::new(),
            spouse_id: None,
            children_ids: Vec::new(),
        }
    }

    pub fn has_parents(&self) -> bool {
        !self.parent_ids.is_empty()
    }

    pub fn has_child(&self, child: PersonId) -> bool {
        self.children_ids.contains(&child)
    }
}

/// Immutable input of one render: the person records in their original
/// enumeration order plus an id index.
#[derive(Debug, Clone, Default)]
pub struct FamilySnapshot {
    people: Vec<Person>,
    index: BTreeMap<PersonId, usize>,
}

impl FamilySnapshot {
    /// Builds a snapshot and checks the structural rules every later stage
    /// relies on. Links to ids that are not in the snapshot are tolerated.
    pub fn new(people: Vec<Person>) -> Result<Self, InputValidationError> {
        let mut index = BTreeMap::new();
        for (pos, person) in people.iter().enumerate() {
            if person.id == 0 {
                return Err(InputValidationError::new(format!(
                    "record #{} has id 0; ids must be positive integers",
                    pos + 1
                )));
            }
            if person.name.trim().is_empty() {
                return Err(InputValidationError::new(format!(
                    "person {} has an empty name",
                    person.id
                )));
            }
            if index.insert(person.id, pos).is_some() {
                return Err(InputValidationError::new(format!(
                    "duplicate person id {}",
                    person.id
                )));
            }
            if person.parent_ids.len() > 2 {
                return Err(InputValidationError::new(format!(
                    "person {} lists {} parents; at most two are allowed",
                    person.id,
                    person.parent_ids.len()
                )));
            }
            let self_link = person.parent_ids.contains(&person.id)
                || person.children_ids.contains(&person.id)
                || person.spouse_id == Some(person.id);
            if self_link {
                return Err(InputValidationError::new(format!(
                    "person {} references itself",
                    person.id
                )));
            }
        }

        let snapshot = Self { people, index };
        for person in &snapshot.people {
            let Some(spouse_id) = person.spouse_id else {
                continue;
            };
            let Some(spouse) = snapshot.get(spouse_id) else {
                continue;
            };
            if spouse.spouse_id != Some(person.id) {
                return Err(InputValidationError::new(format!(
                    "person {} names {} as spouse, but {} does not name {} back",
                    person.id, spouse_id, spouse_id, person.id
                )));
            }
        }
        Ok(snapshot)
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.index.get(&id).map(|pos| &self.people[*pos])
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
