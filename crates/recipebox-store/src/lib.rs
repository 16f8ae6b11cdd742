//! # recipebox-store
//!
//! Recipe storage on top of SQLite.
//!
//! This crate provides:
//! - [`DatabaseConfig`] for pool settings read from the environment
//! - [`RecipesQuery`] for recipe listings that only accept known statuses
//!   and allow-listed sort fields
//! - [`PageRequest`] and [`Pagination`] for bounded, 1-based paging
//! - [`list_recipes`] and [`get_recipe`] for the read paths
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recipebox_store::{list_recipes, DatabaseConfig, PageRequest};
//!
//! # async fn example() -> recipebox_store::Result<()> {
//! let pool = DatabaseConfig::from_env()?
//!     .connect_and_migrate("migrations")
//!     .await?;
//!
//! let request = PageRequest::parse(Some("2"), Some("20"))?;
//! let page = list_recipes(&pool, &request, Some("published")).await?;
//! println!("{} of {}", page.items.len(), page.pagination.total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod pagination;
pub mod query;

pub use config::DatabaseConfig;
pub use error::{Result, StoreError};
pub use manager::{get_recipe, list_recipes};
pub use model::{Recipe, RecipeIngredient, RecipeStatus, RecipeWithIngredients};
pub use pagination::{Page, PageRequest, Pagination};
pub use query::{RecipesQuery, RECIPE_SORT_FIELDS};
