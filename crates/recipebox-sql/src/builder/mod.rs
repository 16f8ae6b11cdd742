//! Parameterized SQL builder.
//!
//! Request-supplied values only ever reach the database as bound parameters,
//! and request-supplied identifiers only after allow-list validation.
//!
//! # Example
//!
//! ```rust
//! use recipebox_sql::builder::QueryBuilder;
//!
//! let (sql, params) = QueryBuilder::new("SELECT id, name FROM users")
//!     .where_eq("active", true)
//!     .build();
//!
//! assert_eq!(sql, "SELECT id, name FROM users WHERE active = $1");
//! assert_eq!(params.len(), 1);
//! ```

mod ordering;
mod query;
pub mod value;

pub use ordering::{is_valid_identifier, FieldAllowList, SortDirection, MAX_IDENTIFIER_LEN};
pub use query::QueryBuilder;
pub use value::{SqlValue, ToSqlValue};
