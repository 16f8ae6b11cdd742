//! Recipe-specific query policy over the generic builder.
//!
//! [`RecipesQuery`] only exposes filters and sort fields that are known to
//! be safe for the `recipes` table. Unknown status values and sort fields
//! are neutralised here; rejecting them with an error is the caller's job.

use recipebox_sql::builder::{FieldAllowList, QueryBuilder, SortDirection, SqlValue};

use crate::model::RecipeStatus;

/// Columns selected for a recipe row.
pub const RECIPE_COLUMNS: &str =
    "id, title, servings, instructions, tips, status, user_id, created_at, updated_at";

/// Columns recipe listings may be sorted by.
pub const RECIPE_SORT_FIELDS: FieldAllowList = FieldAllowList::explicit(
    &["created_at", "updated_at", "title", "id"],
    "created_at",
);

/// Builds a paginated recipe listing.
///
/// The statement also selects `COUNT(*) OVER() AS total_count`, so one
/// execution yields both the page and the total number of matching rows.
///
/// # Example
///
/// ```rust
/// use recipebox_store::RecipesQuery;
///
/// let (sql, params) = RecipesQuery::new()
///     .with_status("published")
///     .with_pagination(10, 0)
///     .build();
///
/// assert!(sql.ends_with(
///     "FROM recipes WHERE status = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
/// ));
/// assert_eq!(params.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RecipesQuery {
    builder: QueryBuilder,
    sort: Option<(String, SortDirection)>,
    pagination: Option<(u32, u32)>,
}

impl RecipesQuery {
    /// Starts an unfiltered listing of all recipes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: QueryBuilder::new(format!(
                "SELECT {RECIPE_COLUMNS}, COUNT(*) OVER() AS total_count FROM recipes"
            )),
            sort: None,
            pagination: None,
        }
    }

    /// Filters by status if `status` is a known [`RecipeStatus`] value.
    ///
    /// Any other string is ignored.
    #[must_use]
    pub fn with_status(self, status: &str) -> Self {
        match RecipeStatus::lookup(status) {
            Some(status) => self.with_status_filter(status),
            None => self,
        }
    }

    /// Filters by a typed status.
    #[must_use]
    pub fn with_status_filter(mut self, status: RecipeStatus) -> Self {
        self.builder = self.builder.where_eq("status", status.as_str());
        self
    }

    /// Sorts by `field` instead of creation time.
    ///
    /// Fields outside [`RECIPE_SORT_FIELDS`] fall back to `created_at`;
    /// directions other than `asc`/`desc` fall back to descending.
    #[must_use]
    pub fn with_sort(mut self, field: &str, direction: &str) -> Self {
        let field = RECIPE_SORT_FIELDS.resolve(field);
        self.sort = Some((field.to_string(), SortDirection::parse_lenient(direction)));
        self
    }

    /// Limits the listing to one page.
    ///
    /// Paginated listings are always ordered, newest first unless
    /// [`with_sort`](Self::with_sort) chose otherwise.
    #[must_use]
    pub fn with_pagination(mut self, limit: u32, offset: u32) -> Self {
        self.pagination = Some((limit, offset));
        self
    }

    /// Renders the statement and its parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let mut builder = self.builder;

        if self.sort.is_some() || self.pagination.is_some() {
            let (field, direction) = self
                .sort
                .unwrap_or_else(|| (String::from("created_at"), SortDirection::Desc));
            builder = builder.order_by(&field, direction, &RECIPE_SORT_FIELDS);
            if field != "id" {
                // Rows sharing a timestamp need a stable order across pages.
                builder = builder.order_by("id", direction, &RECIPE_SORT_FIELDS);
            }
        }

        if let Some((limit, offset)) = self.pagination {
            builder = builder.limit_offset(limit, offset);
        }

        builder.build()
    }
}

impl Default for RecipesQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT id, title, servings, instructions, tips, status, user_id, \
                        created_at, updated_at, COUNT(*) OVER() AS total_count FROM recipes";

    #[test]
    fn test_unfiltered() {
        let (sql, params) = RecipesQuery::new().build();
        assert_eq!(sql, BASE);
        assert!(params.is_empty());
    }

    #[test]
    fn test_status_and_pagination() {
        let (sql, params) = RecipesQuery::new()
            .with_status("review_required")
            .with_pagination(20, 40)
            .build();

        assert_eq!(
            sql,
            format!(
                "{BASE} WHERE status = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
            )
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Text(String::from("review_required")),
                SqlValue::Int(20),
                SqlValue::Int(40),
            ]
        );
    }

    #[test]
    fn test_unknown_status_is_ignored() {
        let (sql, params) = RecipesQuery::new()
            .with_status("published'; DROP TABLE recipes;--")
            .with_pagination(10, 0)
            .build();

        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("DROP"));
        assert_eq!(params, vec![SqlValue::Int(10), SqlValue::Int(0)]);
    }

    #[test]
    fn test_typed_status_filter() {
        let (sql, params) = RecipesQuery::new()
            .with_status_filter(RecipeStatus::Published)
            .build();
        assert_eq!(sql, format!("{BASE} WHERE status = $1"));
        assert_eq!(params, vec![SqlValue::Text(String::from("published"))]);
    }

    #[test]
    fn test_sort_allow_list() {
        let (sql, _) = RecipesQuery::new()
            .with_sort("title", "asc")
            .with_pagination(5, 0)
            .build();
        assert!(sql.contains("ORDER BY title ASC, id ASC LIMIT $1 OFFSET $2"));

        let (sql, _) = RecipesQuery::new()
            .with_sort("id); DELETE FROM users;--", "asc; --")
            .build();
        assert!(sql.ends_with("ORDER BY created_at DESC, id DESC"));
        assert!(!sql.contains("DELETE"));
    }

    #[test]
    fn test_sort_by_id_has_no_duplicate_tiebreak() {
        let (sql, _) = RecipesQuery::new().with_sort("id", "asc").build();
        assert!(sql.ends_with("ORDER BY id ASC"));
    }
}
