pub mod manager;
pub mod models;
pub mod repository;
pub mod company;
pub mod job;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::Repository;
pub use company::CompanyRepository;
pub use job::JobRepository;
