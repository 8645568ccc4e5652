// ==========================================
// Campus Records - repository layer
// ==========================================
// One repository per aggregate, each owning a shared
// SQLite connection behind Arc<Mutex<_>>. Validation
// and audit writes live in the api layer; this layer
// is plain data access.
// ==========================================

pub mod activity_repo;
pub mod course_repo;
pub mod error;
pub mod facilitator_repo;
pub mod program_repo;
pub mod stationery_repo;
pub mod student_repo;

pub use activity_repo::ActivityRepository;
pub use course_repo::{CourseOverview, CourseRepository, NewCourse};
pub use error::{RepositoryError, RepositoryResult};
pub use facilitator_repo::{FacilitatorOverview, FacilitatorRepository, NewFacilitator};
pub use program_repo::{NewProgram, ProgramRepository};
pub use stationery_repo::{NewCoverPage, StationeryRepository};
pub use student_repo::{NewStudent, StudentOverview, StudentRepository};
