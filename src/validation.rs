use thiserror::Error;

use crate::models::{Category, Department, NewAccount, NewCourseRequest, NewStudentRequest};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 3;
const MAX_GPA: f64 = 99.99;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Department is required for senior students")]
    DepartmentRequired,

    #[error("unknown department code: {0}")]
    UnknownDepartment(String),

    #[error("{field} must be between 1 and 3, got {value}")]
    YearOutOfRange { field: &'static str, value: i32 },

    #[error("gpa must be between 0.00 and 99.99, got {0}")]
    GpaOutOfRange(f64),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    #[error("credits must be positive, got {0}")]
    InvalidCredits(i32),
}

/// Juniors never carry a department; seniors must have one.
pub fn normalize_department(
    category: Category,
    department: Option<Department>,
) -> Result<Option<Department>, ValidationError> {
    match (category, department) {
        (Category::Junior, _) => Ok(None),
        (Category::Senior, Some(department)) => Ok(Some(department)),
        (Category::Senior, None) => Err(ValidationError::DepartmentRequired),
    }
}

pub fn check_year(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::YearOutOfRange { field, value })
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail(trimmed.to_string())),
    }
}

pub fn validate_account(account: &NewAccount) -> Result<(), ValidationError> {
    require("username", &account.username)?;
    require("first_name", &account.first_name)?;
    require("last_name", &account.last_name)?;
    require("password", &account.password)?;
    check_email(&account.email)
}

/// Runs every rule a new student must pass, normalizing the department in place.
/// Nothing is written when this returns an error.
pub fn validate_new_student(req: &mut NewStudentRequest) -> Result<(), ValidationError> {
    req.department = normalize_department(req.category, req.department)?;

    validate_account(&req.account)?;
    check_year("enrollment_year", req.enrollment_year)?;
    check_year("current_year", req.current_year)?;

    if let Some(gpa) = req.gpa {
        if !(0.0..=MAX_GPA).contains(&gpa) {
            return Err(ValidationError::GpaOutOfRange(gpa));
        }
    }

    require("address", &req.address)?;
    require("father_name", &req.father_name)?;
    require("mother_name", &req.mother_name)?;
    require("parent_phone_number", &req.parent_phone_number)?;
    require("emergency_contact_name", &req.emergency_contact_name)?;
    require("emergency_contact_relationship", &req.emergency_contact_relationship)?;
    require("emergency_contact_phone_number", &req.emergency_contact_phone_number)?;

    if let Some(email) = req.parent_email.as_deref().filter(|e| !e.trim().is_empty()) {
        check_email(email)?;
    }

    Ok(())
}

pub fn validate_new_course(req: &NewCourseRequest) -> Result<(), ValidationError> {
    require("code", &req.code)?;
    require("name", &req.name)?;
    if req.credits <= 0 {
        return Err(ValidationError::InvalidCredits(req.credits));
    }
    Ok(())
}
