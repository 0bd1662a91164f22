//! Person record models shared by storage, service and API layers

use serde::{Deserialize, Serialize};

/// Fully enriched person record, not yet stored
///
/// Only ever built once all three lookups succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
    pub age: i64,
    pub gender: String,
    pub country: String,
}

impl NewPerson {
    /// Attach the storage-assigned id
    pub fn with_id(self, id: i64) -> PersonInfo {
        PersonInfo {
            id,
            name: self.name,
            surname: self.surname,
            age: self.age,
            gender: self.gender,
            country: self.country,
        }
    }
}

/// Stored person record
///
/// Every field defaults when absent from JSON, so partial update bodies
/// overwrite the missing fields with zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInfo {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub country: String,
}

/// Equality filters and pagination for person lookups
///
/// `None` and zero values both mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub country: Option<String>,
    /// Maximum number of rows (LIMIT)
    pub count: Option<i64>,
    /// Rows to skip (OFFSET)
    pub offset: Option<i64>,
}

impl PersonFilter {
    pub fn id(&self) -> Option<i64> {
        non_zero(self.id)
    }

    pub fn age(&self) -> Option<i64> {
        non_zero(self.age)
    }

    pub fn count(&self) -> Option<i64> {
        non_zero(self.count)
    }

    pub fn offset(&self) -> Option<i64> {
        non_zero(self.offset)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn surname(&self) -> Option<&str> {
        non_empty(&self.surname)
    }

    pub fn gender(&self) -> Option<&str> {
        non_empty(&self.gender)
    }

    pub fn country(&self) -> Option<&str> {
        non_empty(&self.country)
    }
}

fn non_zero(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_zero_values_are_unset() {
        let filter = PersonFilter {
            id: Some(0),
            age: Some(0),
            name: Some(String::new()),
            count: Some(10),
            ..Default::default()
        };

        assert_eq!(filter.id(), None);
        assert_eq!(filter.age(), None);
        assert_eq!(filter.name(), None);
        assert_eq!(filter.count(), Some(10));
        assert_eq!(filter.offset(), None);
    }

    #[test]
    fn test_person_info_json_shape() {
        let info = NewPerson {
            name: "Dmitry".to_string(),
            surname: "Federov".to_string(),
            age: 22,
            gender: "male".to_string(),
            country: "RU".to_string(),
        }
        .with_id(12);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], 12);
        assert_eq!(json["name"], "Dmitry");
        assert_eq!(json["surname"], "Federov");
        assert_eq!(json["age"], 22);
        assert_eq!(json["gender"], "male");
        assert_eq!(json["country"], "RU");
    }

    #[test]
    fn test_person_info_accepts_partial_body() {
        let info: PersonInfo = serde_json::from_str(r#"{"age":3}"#).unwrap();
        assert_eq!(info.age, 3);
        assert!(info.name.is_empty());
        assert!(info.surname.is_empty());
    }

    #[test]
    fn test_person_info_missing_optional_fields() {
        let info: PersonInfo =
            serde_json::from_str(r#"{"name":"Ivan","surname":"Petrov"}"#).unwrap();
        assert_eq!(info.id, 0);
        assert_eq!(info.age, 0);
        assert!(info.country.is_empty());
    }
}
