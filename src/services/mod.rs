pub mod enrollment_service;
pub mod student_service;

pub use enrollment_service::EnrollmentService;
pub use student_service::StudentService;
