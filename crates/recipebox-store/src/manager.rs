//! Recipe reads against a SQLite pool.

use recipebox_sql::builder::{FieldAllowList, QueryBuilder, SortDirection, SqlValue};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{FromRow, Sqlite};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::model::{Recipe, RecipeIngredient, RecipeWithIngredients};
use crate::pagination::{Page, PageRequest, Pagination};
use crate::query::{RecipesQuery, RECIPE_COLUMNS};

type QueryAs<'q, M> = sqlx::query::QueryAs<'q, Sqlite, M, SqliteArguments<'q>>;

const INGREDIENT_ORDER: FieldAllowList = FieldAllowList::explicit(&["ri.id"], "ri.id");

#[derive(Debug, FromRow)]
struct RecipeRow {
    #[sqlx(flatten)]
    recipe: Recipe,
    total_count: i64,
}

/// Lists one page of recipes, newest first.
///
/// `status` is applied only when it names a known status; any other value
/// lists all recipes. The total is read from the window count of the first
/// row, so a page past the end reports a total of 0.
pub async fn list_recipes(
    pool: &SqlitePool,
    request: &PageRequest,
    status: Option<&str>,
) -> Result<Page<Recipe>> {
    let mut query = RecipesQuery::new();
    if let Some(status) = status {
        query = query.with_status(status);
    }
    let (sql, params) = query
        .with_pagination(request.limit(), request.offset())
        .build();

    debug!(sql = %sql, params = params.len(), "Listing recipes");

    let rows: Vec<RecipeRow> = bind_params(sqlx::query_as(&sql), params)
        .fetch_all(pool)
        .await?;

    let total = rows.first().map_or(0, |row| row.total_count);
    let items = rows.into_iter().map(|row| row.recipe).collect();

    Ok(Page {
        items,
        pagination: Pagination::new(request, total),
    })
}

/// Fetches a recipe and its ingredient lines in insertion order.
pub async fn get_recipe(pool: &SqlitePool, id: i64) -> Result<RecipeWithIngredients> {
    let (sql, params) = QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes"))
        .where_eq("id", id)
        .build();

    let recipe: Recipe = bind_params(sqlx::query_as(&sql), params)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("recipe"))?;

    let (sql, params) = QueryBuilder::new(
        "SELECT ri.id, ri.recipe_id, ri.canonical_ingredient_id, ri.original_text, \
         ri.quantity, ri.unit, ci.name AS canonical_name, ri.created_at, ri.updated_at \
         FROM recipe_ingredients ri \
         LEFT JOIN canonical_ingredients ci ON ci.id = ri.canonical_ingredient_id",
    )
    .where_eq("ri.recipe_id", id)
    .order_by("ri.id", SortDirection::Asc, &INGREDIENT_ORDER)
    .build();

    let ingredients: Vec<RecipeIngredient> = bind_params(sqlx::query_as(&sql), params)
        .fetch_all(pool)
        .await?;

    debug!(recipe_id = id, ingredients = ingredients.len(), "Loaded recipe");

    Ok(RecipeWithIngredients {
        recipe,
        ingredients,
    })
}

fn bind_params<'q, M>(query: QueryAs<'q, M>, params: Vec<SqlValue>) -> QueryAs<'q, M>
where
    M: for<'r> FromRow<'r, SqliteRow>,
{
    params.into_iter().fold(query, bind_param)
}

fn bind_param<'q, M>(query: QueryAs<'q, M>, value: SqlValue) -> QueryAs<'q, M>
where
    M: for<'r> FromRow<'r, SqliteRow>,
{
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
    }
}
