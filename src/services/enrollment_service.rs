use std::collections::BTreeSet;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    BulkRegistrationReport, BulkRegistrationRequest, Course, Enrollment, EnrollmentView,
};
use crate::validation;

pub struct EnrollmentService {
    db: SqlitePool,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Enrolls one student in one course. Returns the enrollment and whether
    /// it was created by this call; an existing row comes back unchanged.
    pub async fn register(
        &self,
        student_ref: &str,
        course_ref: &str,
    ) -> Result<(Enrollment, bool), AppError> {
        let student = repository::find_student_by_id(&self.db, student_ref)
            .await?
            .ok_or(AppError::NotFound)?;
        let course = repository::find_course_by_id(&self.db, course_ref)
            .await?
            .ok_or(AppError::NotFound)?;

        let (enrollment, created) =
            repository::get_or_create_enrollment(&self.db, &student.id, &course.id).await?;
        if created {
            info!("Enrolled {} in {}", student.student_id, course.code);
        }
        Ok((enrollment, created))
    }

    /// Enrolls every student of the cohort in every selected course.
    ///
    /// All course ids are resolved before anything is written. After that
    /// each (course, student) pair is attempted independently: a failing pair
    /// is logged and counted, the rest still run. Re-running with the same
    /// input creates nothing new.
    pub async fn bulk_register(
        &self,
        req: BulkRegistrationRequest,
    ) -> Result<BulkRegistrationReport, AppError> {
        validation::check_year("year", req.cohort.year)?;

        let course_ids: BTreeSet<String> = req.course_ids.into_iter().collect();
        let mut courses: Vec<Course> = Vec::with_capacity(course_ids.len());
        for id in &course_ids {
            let course = repository::find_course_by_id(&self.db, id)
                .await?
                .ok_or(AppError::NotFound)?;
            courses.push(course);
        }

        let cohort = repository::fetch_cohort(&self.db, &req.cohort).await?;

        let mut report = BulkRegistrationReport {
            cohort_size: cohort.len(),
            courses: courses.len(),
            ..Default::default()
        };

        for course in &courses {
            for student in &cohort {
                report.pairs_considered += 1;
                match repository::get_or_create_enrollment(&self.db, &student.id, &course.id).await
                {
                    Ok((_, true)) => report.created += 1,
                    Ok((_, false)) => report.already_enrolled += 1,
                    Err(err) => {
                        warn!(
                            "Failed to enroll {} in {}: {}",
                            student.student_id, course.code, err
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            "Bulk registration for {} year {} ({}): {} students x {} courses, created {}, existing {}, failed {}",
            req.cohort.category,
            req.cohort.year,
            req.cohort
                .department
                .map(|d| d.code())
                .unwrap_or("all departments"),
            report.cohort_size,
            report.courses,
            report.created,
            report.already_enrolled,
            report.failed
        );

        Ok(report)
    }

    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<Enrollment, AppError> {
        repository::set_enrollment_completed(&self.db, id, completed)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// A student's dashboard listing.
    pub async fn enrollments_for_student(
        &self,
        student_ref: &str,
    ) -> Result<Vec<EnrollmentView>, AppError> {
        repository::find_student_by_id(&self.db, student_ref)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(repository::fetch_enrollments_for_student(&self.db, student_ref).await?)
    }
}
