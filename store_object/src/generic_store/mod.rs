pub mod core;
pub mod list;
pub mod pg_executor;
pub mod write;

pub use core::TableStore;
pub use pg_executor::PgExecutor;
