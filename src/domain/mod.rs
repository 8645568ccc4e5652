// ==========================================
// Campus Records - domain layer
// ==========================================
// Plain entities and shared types. No storage
// details, no request handling.
// ==========================================

pub mod activity;
pub mod course;
pub mod facilitator;
pub mod program;
pub mod stationery;
pub mod student;
pub mod types;

pub use activity::Activity;
pub use course::Course;
pub use facilitator::Facilitator;
pub use program::Program;
pub use stationery::{CoverPage, Question};
pub use student::Student;
pub use types::{ActivityCategory, CategoryStyle};
