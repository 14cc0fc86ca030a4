pub mod args;
pub mod error;
pub mod model;
pub mod storage;
pub mod controller {
    pub mod courses;
    pub mod db_prefill;
    pub mod identity;
    pub mod players;
    pub mod report;
    pub mod rounds;
    pub mod workflow;
}
pub mod view {
    pub mod report;
}

pub use error::AppError;
pub use storage::{SqlStorage, Storage, StorageError};
