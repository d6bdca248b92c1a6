use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::credentials;
use crate::db::repository;
use crate::error::{AppError, is_unique_violation};
use crate::models::{NewStudentRequest, Student};
use crate::validation;

/// Each taken ID moves the counter past it before the next attempt.
const MAX_ALLOCATION_ATTEMPTS: usize = 3;

pub struct StudentService {
    db: SqlitePool,
}

enum CreateFailure {
    StudentIdTaken(String),
    App(AppError),
}

impl From<sqlx::Error> for CreateFailure {
    fn from(err: sqlx::Error) -> Self {
        CreateFailure::App(AppError::Database(err))
    }
}

impl StudentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Validates, then writes the account and the student in one transaction.
    /// Either both rows exist afterwards or neither does.
    pub async fn create_student(&self, mut req: NewStudentRequest) -> Result<Student, AppError> {
        validation::validate_new_student(&mut req)?;
        let password_hash = credentials::hash_password(&req.account.password)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(&req, &password_hash).await {
                Ok(student) => {
                    info!(
                        "Created {} student {} for account {}",
                        student.category, student.student_id, req.account.username
                    );
                    return Ok(student);
                }
                Err(CreateFailure::StudentIdTaken(id)) if attempt < MAX_ALLOCATION_ATTEMPTS => {
                    warn!("Student id {} already assigned, retrying allocation", id);
                    let mut conn = self.db.acquire().await?;
                    repository::skip_student_id(&mut conn, req.category, &id).await?;
                }
                Err(CreateFailure::StudentIdTaken(id)) => {
                    return Err(AppError::Conflict(format!(
                        "student id {} is already assigned",
                        id
                    )));
                }
                Err(CreateFailure::App(err)) => return Err(err),
            }
        }
    }

    async fn try_create(
        &self,
        req: &NewStudentRequest,
        password_hash: &str,
    ) -> Result<Student, CreateFailure> {
        let mut tx = self.db.begin().await?;

        let account = repository::insert_account(&mut *tx, &req.account, password_hash.to_string())
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CreateFailure::App(AppError::Conflict(format!(
                        "username {} is already taken",
                        req.account.username.trim()
                    )))
                } else {
                    err.into()
                }
            })?;

        let student_id = repository::allocate_student_id(&mut *tx, req.category).await?;

        let student = repository::insert_student(&mut *tx, &account.id, &student_id, req)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CreateFailure::StudentIdTaken(student_id.clone())
                } else {
                    err.into()
                }
            })?;

        tx.commit().await?;
        Ok(student)
    }

    pub async fn get_student(&self, id: &str) -> Result<Student, AppError> {
        repository::find_student_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
