use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::student::{Category, Department, deserialize_optional_department};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: String,
    pub student_ref: String,
    pub course_ref: String,
    pub date_enrolled: NaiveDate,
    pub completed: bool,
}

/// One line of a student's dashboard: the enrollment plus the course it points at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentView {
    pub id: String,
    pub course_ref: String,
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub date_enrolled: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub student_ref: String,
    pub course_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub enrollment: Enrollment,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompletionRequest {
    pub completed: bool,
}

fn first_year() -> i32 {
    1
}

/// Which students a bulk registration targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFilter {
    pub category: Category,
    #[serde(default = "first_year")]
    pub year: i32,
    #[serde(default, deserialize_with = "deserialize_optional_department")]
    pub department: Option<Department>,
}

impl CohortFilter {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            year: first_year(),
            department: None,
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRegistrationRequest {
    pub course_ids: Vec<String>,
    #[serde(flatten)]
    pub cohort: CohortFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRegistrationReport {
    pub cohort_size: usize,
    pub courses: usize,
    pub pairs_considered: usize,
    pub created: usize,
    pub already_enrolled: usize,
    pub failed: usize,
}
