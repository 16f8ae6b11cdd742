//! Dynamic SELECT builder over a fixed base statement.
//!
//! [`QueryBuilder`] starts from a trusted base statement (usually a
//! `SELECT ... FROM table` literal) and accumulates equality filters,
//! ordering and pagination. Values are bound as positional `$n` parameters.
//! Identifiers either come from `'static` strings in code or pass through a
//! [`FieldAllowList`].
//!
//! Clauses are rendered in SQL order by [`QueryBuilder::build`], so the
//! order in which the builder methods are called does not affect the output
//! shape.

use super::ordering::{FieldAllowList, SortDirection};
use super::value::{SqlValue, ToSqlValue};

/// A parameterized query under construction.
///
/// # Example
///
/// ```rust
/// use recipebox_sql::builder::{FieldAllowList, QueryBuilder, SortDirection, SqlValue};
///
/// const FIELDS: FieldAllowList = FieldAllowList::explicit(&["created_at"], "created_at");
///
/// let (sql, params) = QueryBuilder::new("SELECT id FROM recipes")
///     .where_eq("status", "published")
///     .order_by("created_at", SortDirection::Desc, &FIELDS)
///     .limit_offset(10, 20)
///     .build();
///
/// assert_eq!(
///     sql,
///     "SELECT id FROM recipes WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
/// );
/// assert_eq!(params[0], SqlValue::Text(String::from("published")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    base: String,
    conditions: Vec<(&'static str, SqlValue)>,
    has_condition: bool,
    ordering: Vec<(String, SortDirection)>,
    pagination: Option<(SqlValue, SqlValue)>,
}

impl QueryBuilder {
    /// Creates a builder seeded with a base statement.
    ///
    /// The base statement is written verbatim and must not contain
    /// request-supplied text.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            conditions: vec![],
            has_condition: false,
            ordering: vec![],
            pagination: None,
        }
    }

    /// Adds an equality condition `field = $n`.
    ///
    /// The first condition opens the WHERE clause, later ones are joined
    /// with AND.
    #[must_use]
    pub fn where_eq<T: ToSqlValue>(mut self, field: &'static str, value: T) -> Self {
        self.conditions.push((field, value.to_sql_value()));
        self.has_condition = true;
        self
    }

    /// Adds an ORDER BY term.
    ///
    /// `field` is resolved through `allowed`; a field that is not permitted
    /// is replaced by the list's default field.
    #[must_use]
    pub fn order_by(
        mut self,
        field: &str,
        direction: SortDirection,
        allowed: &FieldAllowList,
    ) -> Self {
        let field = allowed.resolve(field);
        self.ordering.push((String::from(field), direction));
        self
    }

    /// Adds an ORDER BY term from an untyped direction string.
    ///
    /// Unknown directions become DESC.
    #[must_use]
    pub fn order_by_str(self, field: &str, direction: &str, allowed: &FieldAllowList) -> Self {
        self.order_by(field, SortDirection::parse_lenient(direction), allowed)
    }

    /// Adds `LIMIT $n OFFSET $n+1`, binding both values.
    ///
    /// Calling this again replaces the previous pagination.
    #[must_use]
    pub fn limit_offset(mut self, limit: u32, offset: u32) -> Self {
        self.pagination = Some((limit.to_sql_value(), offset.to_sql_value()));
        self
    }

    /// Returns true once at least one condition has been added.
    #[must_use]
    pub const fn has_condition(&self) -> bool {
        self.has_condition
    }

    /// Returns the index the next bound parameter would receive.
    #[must_use]
    pub fn next_placeholder(&self) -> usize {
        let paginated = if self.pagination.is_some() { 2 } else { 0 };
        self.conditions.len() + paginated + 1
    }

    /// Returns the bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> Vec<SqlValue> {
        let mut params: Vec<SqlValue> = self.conditions.iter().map(|(_, v)| v.clone()).collect();
        if let Some((limit, offset)) = &self.pagination {
            params.push(limit.clone());
            params.push(offset.clone());
        }
        params
    }

    /// Renders the statement text and its parallel parameter list.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let mut sql = self.base.trim_end().to_string();
        let mut params = Vec::with_capacity(self.conditions.len() + 2);
        let mut index = 1;

        for (i, (field, value)) in self.conditions.into_iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            sql.push_str(&format!(
                " {keyword} {field} = {}",
                SqlValue::placeholder(index)
            ));
            params.push(value);
            index += 1;
        }

        if !self.ordering.is_empty() {
            let terms: Vec<String> = self
                .ordering
                .iter()
                .map(|(field, dir)| format!("{field} {dir}"))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some((limit, offset)) = self.pagination {
            sql.push_str(&format!(
                " LIMIT {} OFFSET {}",
                SqlValue::placeholder(index),
                SqlValue::placeholder(index + 1)
            ));
            params.push(limit);
            params.push(offset);
        }

        (sql, params)
    }
}
