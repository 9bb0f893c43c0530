pub mod db_pool;
pub mod response;

pub use db_pool::DbPool;
pub use response::{ApiResponse, ApiResult};
