pub mod types;
pub mod filter_where;
pub mod filter_set;
pub mod filter_order;
pub mod update;
pub mod company;
pub mod job;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter_where::{build_where_clause, build_where_clause_from, FilterWhere};
pub use filter_set::build_set_clause;
pub use filter_order::FilterOrder;
pub use update::PartialUpdate;
pub use company::CompanyFilter;
pub use job::JobFilter;
