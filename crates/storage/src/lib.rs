pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::StoreError;
pub use memory::{MemoryStore, StoreState};
pub use record::{Achievement, CourseType, ProgressRecord, UnknownCourseType, UserAchievement};
pub use traits::ProgressStore;
