pub mod account;
pub mod course;
pub mod enrollment;
pub mod news;
pub mod student;

pub use account::{Account, NewAccount};
pub use course::{Course, CourseLevel, NewCourseRequest};
pub use enrollment::{
    BulkRegistrationReport, BulkRegistrationRequest, CohortFilter, Enrollment, EnrollmentView,
    RegisterRequest, RegisterResponse, UpdateCompletionRequest,
};
pub use news::{
    Announcement, AnnouncementDetail, NewAnnouncementRequest, NewNewsRequest, News, NewsDetail,
};
pub use student::{
    Category, Department, Gender, NewStudentRequest, Student, StudentQueryParams, StudentSummary,
};
