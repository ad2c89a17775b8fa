//! Assignment Module
//! Mission: Task upload by users, review by the addressed admin

pub mod api;
pub mod models;
pub mod store;

pub use models::{Assignment, AssignmentStatus, AssignmentView};
pub use store::AssignmentStore;
