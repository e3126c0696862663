pub mod alarm;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod organize;
pub mod storage;
pub mod store;
pub mod task_api;

pub use error::AppError;
pub use task_api::TaskApi;
