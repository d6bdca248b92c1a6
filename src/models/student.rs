use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::models::account::NewAccount;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    Junior,
    Senior,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Junior, Category::Senior];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Junior => "Junior",
            Category::Senior => "Senior",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Department {
    #[serde(rename = "ELE")]
    #[sqlx(rename = "ELE")]
    Electrical,
    #[serde(rename = "MEC")]
    #[sqlx(rename = "MEC")]
    Mechanical,
    #[serde(rename = "AUT")]
    #[sqlx(rename = "AUT")]
    Automobile,
    #[serde(rename = "BLD")]
    #[sqlx(rename = "BLD")]
    Building,
    #[serde(rename = "WDW")]
    #[sqlx(rename = "WDW")]
    Woodwork,
    #[serde(rename = "PLB")]
    #[sqlx(rename = "PLB")]
    Plumbing,
    #[serde(rename = "CSC")]
    #[sqlx(rename = "CSC")]
    ComputerScience,
    #[serde(rename = "PNT")]
    #[sqlx(rename = "PNT")]
    Painting,
    #[serde(rename = "WLD")]
    #[sqlx(rename = "WLD")]
    Welding,
    #[serde(rename = "TRV")]
    #[sqlx(rename = "TRV")]
    RadioTelevision,
}

impl Department {
    pub const ALL: [Department; 10] = [
        Department::Electrical,
        Department::Mechanical,
        Department::Automobile,
        Department::Building,
        Department::Woodwork,
        Department::Plumbing,
        Department::ComputerScience,
        Department::Painting,
        Department::Welding,
        Department::RadioTelevision,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Department::Electrical => "ELE",
            Department::Mechanical => "MEC",
            Department::Automobile => "AUT",
            Department::Building => "BLD",
            Department::Woodwork => "WDW",
            Department::Plumbing => "PLB",
            Department::ComputerScience => "CSC",
            Department::Painting => "PNT",
            Department::Welding => "WLD",
            Department::RadioTelevision => "TRV",
        }
    }
}

impl FromStr for Department {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Department::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ValidationError::UnknownDepartment(code.to_string()))
    }
}

/// Form fields send `""` for "no department"; treat it the same as a missing value.
pub fn deserialize_optional_department<'de, D>(deserializer: D) -> Result<Option<Department>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => code.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Gender {
    #[serde(rename = "M")]
    #[sqlx(rename = "M")]
    Male,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    Female,
    #[serde(rename = "O")]
    #[sqlx(rename = "O")]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub user_id: String,
    pub student_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub address: String,
    pub category: Category,
    pub enrollment_year: i32,
    pub current_year: i32,
    pub gpa: Option<f64>,
    pub department: Option<Department>,
    pub father_name: String,
    pub mother_name: String,
    pub parent_phone_number: String,
    pub parent_email: Option<String>,
    pub parent_address: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_relationship: String,
    pub emergency_contact_phone_number: String,
    pub emergency_contact_address: Option<String>,
    pub date_joined: NaiveDate,
    pub last_updated: DateTime<Utc>,
}

/// Row shape of the admin student list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentSummary {
    pub id: String,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub category: Category,
    pub current_year: i32,
    pub department: Option<Department>,
}

fn first_year() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentRequest {
    #[serde(flatten)]
    pub account: NewAccount,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub phone_number: String,
    pub address: String,
    pub category: Category,
    #[serde(default = "first_year")]
    pub enrollment_year: i32,
    #[serde(default = "first_year")]
    pub current_year: i32,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_department")]
    pub department: Option<Department>,
    pub father_name: String,
    pub mother_name: String,
    pub parent_phone_number: String,
    #[serde(default)]
    pub parent_email: Option<String>,
    #[serde(default)]
    pub parent_address: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_relationship: String,
    pub emergency_contact_phone_number: String,
    #[serde(default)]
    pub emergency_contact_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentQueryParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_parses_codes_case_insensitively() {
        assert_eq!("CSC".parse::<Department>().unwrap(), Department::ComputerScience);
        assert_eq!(" ele ".parse::<Department>().unwrap(), Department::Electrical);
        assert!("XYZ".parse::<Department>().is_err());
    }

    #[test]
    fn empty_department_deserializes_as_none() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "deserialize_optional_department")]
            department: Option<Department>,
        }

        let form: Form = serde_json::from_str(r#"{"department": ""}"#).unwrap();
        assert_eq!(form.department, None);

        let form: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(form.department, None);

        let form: Form = serde_json::from_str(r#"{"department": "WLD"}"#).unwrap();
        assert_eq!(form.department, Some(Department::Welding));

        assert!(serde_json::from_str::<Form>(r#"{"department": "nope"}"#).is_err());
    }
}
