//! # recipebox-sql
//!
//! Safe, parameterized SQL composition for resource listings.
//!
//! This crate provides:
//! - A [`QueryBuilder`] that accumulates equality filters, ordering and
//!   pagination over a fixed base statement
//! - [`FieldAllowList`] validation for identifiers that vary per request
//! - [`SqlValue`] parameters that are bound, never inlined
//!
//! ## SQL Injection Prevention
//!
//! ```rust
//! use recipebox_sql::builder::{QueryBuilder, SqlValue};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = QueryBuilder::new("SELECT id FROM users")
//!     .where_eq("name", user_input)
//!     .build();
//!
//! assert_eq!(sql, "SELECT id FROM users WHERE name = $1");
//! assert_eq!(params, vec![SqlValue::Text(String::from(user_input))]);
//! ```

pub mod builder;

pub use builder::{FieldAllowList, QueryBuilder, SortDirection, SqlValue, ToSqlValue};
