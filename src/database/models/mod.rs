pub mod company;
pub mod job;

pub use company::{Company, CompanyDetail, CompanyField, NewCompany};
pub use job::{Job, JobDetail, JobField, NewJob};
