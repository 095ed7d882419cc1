use serde_json::{Map, Value};

use crate::dates::parse_birth_date;
use crate::error::InputValidationError;
use crate::ir::{FamilySnapshot, Person, PersonId};

/// Parses a JSON array of person records. Strict JSON is tried first; hand
/// edited files with comments or trailing commas fall back to JSON5.
pub fn parse_family(input: &str) -> Result<FamilySnapshot, InputValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputValidationError::new(
            "no family data provided; expected a JSON array of person records",
        ));
    }
    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(json_err) => match json5::from_str::<Value>(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Err(InputValidationError::new(format!(
                    "input is not valid JSON ({json_err})"
                )));
            }
        },
    };
    people_from_value(&value)
}

pub fn people_from_value(value: &Value) -> Result<FamilySnapshot, InputValidationError> {
    let Some(records) = value.as_array() else {
        return Err(InputValidationError::new(
            "family data must be an array of person records",
        ));
    };
    let mut people = Vec::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        let Some(fields) = record.as_object() else {
            return Err(InputValidationError::new(format!(
                "record #{} is not an object",
                pos + 1
            )));
        };
        people.push(parse_person(pos + 1, fields)?);
    }
    FamilySnapshot::new(people)
}

fn parse_person(ordinal: usize, fields: &Map<String, Value>) -> Result<Person, InputValidationError> {
    let missing = |field: &str| {
        InputValidationError::new(format!(
            "record #{ordinal} is missing {field}; every person needs id, name and birthDate"
        ))
    };

    let id_value = fields.get("id").filter(|v| !v.is_null()).ok_or_else(|| missing("id"))?;
    let id = as_person_id(id_value).ok_or_else(|| {
        InputValidationError::new(format!(
            "record #{ordinal} has id {id_value}; ids must be positive integers"
        ))
    })?;

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing("name"))?;

    let raw_date = fields
        .get("birthDate")
        .and_then(Value::as_str)
        .filter(|date| !date.trim().is_empty())
        .ok_or_else(|| missing("birthDate"))?;
    let birth_date = parse_birth_date(raw_date).ok_or_else(|| {
        InputValidationError::new(format!(
            "person {id} has birthDate {raw_date:?}; use the form YYYY-MM-DD"
        ))
    })?;

    let parent_ids = id_list(fields, "parentIds", id)?;
    let children_ids = id_list(fields, "childrenIds", id)?;
    let spouse_id = match fields.get("spouseId") {
        None | Some(Value::Null) => None,
        Some(value) => Some(as_person_id(value).ok_or_else(|| {
            InputValidationError::new(format!("person {id} has an invalid spouseId {value}"))
        })?),
    };

    Ok(Person {
        id,
        name: name.to_string(),
        birth_date,
        parent_ids,
        spouse_id,
        children_ids,
    })
}

fn id_list(
    fields: &Map<String, Value>,
    key: &str,
    owner: PersonId,
) -> Result<Vec<PersonId>, InputValidationError> {
    let items = match fields.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(InputValidationError::new(format!(
                "person {owner} has {key} {other}; expected an array of ids"
            )));
        }
    };
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = as_person_id(item).ok_or_else(|| {
            InputValidationError::new(format!("person {owner} has an invalid entry {item} in {key}"))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn as_person_id(value: &Value) -> Option<PersonId> {
    let raw = value.as_u64().or_else(|| {
        // JSON5 may hand integral numbers over as floats.
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 1.0)
            .map(|f| f as u64)
    })?;
    if raw == 0 {
        return None;
    }
    PersonId::try_from(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_records() {
        let snapshot = parse_family(
            r#"[
                {"id": 1, "name": "Ann", "birthDate": "1950-01-02", "spouseId": 2, "childrenIds": [3]},
                {"id": 2, "name": "Bob", "birthDate": "1949-07-30", "spouseId": 1, "childrenIds": [3]},
                {"id": 3, "name": "Cid", "birthDate": "1975-11-11", "parentIds": [1, 2], "spouseId": null}
            ]"#,
        )
        .expect("valid input");
        assert_eq!(snapshot.len(), 3);
        let cid = snapshot.get(3).expect("person 3");
        assert_eq!(cid.parent_ids, vec![1, 2]);
        assert_eq!(cid.spouse_id, None);
        assert!(cid.children_ids.is_empty());
    }

    #[test]
    fn accepts_json5_comments_and_trailing_commas() {
        let snapshot = parse_family(
            "[\n  // grandmother\n  {id: 1, name: 'Ann', birthDate: '1950-01-02',},\n]",
        )
        .expect("lenient input");
        assert_eq!(snapshot.get(1).map(|p| p.name.as_str()), Some("Ann"));
    }

    #[test]
    fn rejects_non_array_input() {
        let err = parse_family(r#"{"id": 1}"#).unwrap_err();
        assert!(err.message.contains("must be an array"));
    }

    #[test]
    fn rejects_missing_required_fields() {
        let err = parse_family(r#"[{"id": 1, "name": "Ann"}]"#).unwrap_err();
        assert!(err.message.contains("missing birthDate"));
        let err = parse_family(r#"[{"name": "Ann", "birthDate": "2000-01-01"}]"#).unwrap_err();
        assert!(err.message.contains("missing id"));
        let err = parse_family(r#"[{"id": 4, "name": "", "birthDate": "2000-01-01"}]"#).unwrap_err();
        assert!(err.message.contains("missing name"));
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = parse_family(r#"[{"id": 0, "name": "Ann", "birthDate": "2000-01-01"}]"#)
            .unwrap_err();
        assert!(err.message.contains("positive integers"));
        assert!(
            parse_family(r#"[{"id": -3, "name": "Ann", "birthDate": "2000-01-01"}]"#).is_err()
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_family("not json at all").unwrap_err();
        assert!(err.message.starts_with("input is not valid JSON"));
        assert!(parse_family("   ").is_err());
    }
}
