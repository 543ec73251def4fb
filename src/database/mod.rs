pub mod manager;
pub mod repository;

pub use manager::{Database, DatabaseError};
pub use repository::{Repository, UpdateOutcome};
