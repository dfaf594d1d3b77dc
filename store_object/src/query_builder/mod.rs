//! Query engine
//!
//! Validation of JSON query descriptions, rendering into parameterized SQL,
//! and the list builder that adds paging, ordering and projection.

pub mod builder;
pub mod filter;
pub mod options;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod validator;



pub use builder::ListQuery;
pub use filter::{LogicalOperator, Operand, QueryCondition, QueryFilter, QueryOperator};
pub use options::ListOptions;
pub use ordering::SortOrder;
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use sql_generation::{SqlGenerator, Statement};
pub use validator::{QueryValidator, ValidatedQuery};
