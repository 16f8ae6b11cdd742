//! Recipe listing and lookup against a migrated in-memory database.

use std::path::Path;

use recipebox_store::{get_recipe, list_recipes, PageRequest, RecipeStatus, StoreError};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    recipebox_migrate::run_migrations(&pool, &migrations)
        .await
        .unwrap();

    sqlx::query("INSERT INTO users (id, email) VALUES (1, 'cook@example.com')")
        .execute(&pool)
        .await
        .unwrap();

    // Recipe n is created on day n, so newest first lists 5, 4, 3, 2, 1.
    let statuses = ["published", "processing", "published", "review_required", "published"];
    for (i, status) in statuses.iter().enumerate() {
        let n = i + 1;
        sqlx::query(
            "INSERT INTO recipes (id, title, status, user_id, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(i64::try_from(n).unwrap())
        .bind(format!("Recipe {n}"))
        .bind(*status)
        .bind(format!("2024-01-0{n}T12:00:00Z"))
        .bind(format!("2024-01-0{n}T12:00:00Z"))
        .execute(&pool)
        .await
        .unwrap();
    }

    pool
}

fn ids(page: &recipebox_store::Page<recipebox_store::Recipe>) -> Vec<i64> {
    page.items.iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn second_page_of_two() {
    let pool = seeded_pool().await;
    let request = PageRequest::new(2, 2).unwrap();

    let page = list_recipes(&pool, &request, None).await.unwrap();

    assert_eq!(ids(&page), vec![3, 2]);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.per_page, 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 3);
}

#[tokio::test]
async fn status_filter_counts_only_matches() {
    let pool = seeded_pool().await;

    let page = list_recipes(&pool, &PageRequest::default(), Some("published"))
        .await
        .unwrap();

    assert_eq!(ids(&page), vec![5, 3, 1]);
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(page
        .items
        .iter()
        .all(|r| r.parsed_status() == Some(RecipeStatus::Published)));
}

#[tokio::test]
async fn unknown_status_lists_everything() {
    let pool = seeded_pool().await;

    for status in ["draft", "published' OR '1'='1", "published; DROP TABLE recipes;--"] {
        let page = list_recipes(&pool, &PageRequest::default(), Some(status))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 5, "{status}");
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 5);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let pool = seeded_pool().await;
    let request = PageRequest::new(4, 2).unwrap();

    let page = list_recipes(&pool, &request, None).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.total_pages, 0);
}

#[tokio::test]
async fn same_timestamp_pages_do_not_overlap() {
    let pool = seeded_pool().await;
    sqlx::query("UPDATE recipes SET created_at = '2024-02-01T00:00:00Z'")
        .execute(&pool)
        .await
        .unwrap();

    let mut seen = Vec::new();
    for page in 1..=3 {
        let request = PageRequest::new(page, 2).unwrap();
        seen.extend(ids(&list_recipes(&pool, &request, None).await.unwrap()));
    }

    assert_eq!(seen, vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn recipe_with_ingredients() {
    let pool = seeded_pool().await;
    sqlx::query("INSERT INTO canonical_ingredients (id, name) VALUES (1, 'flour')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO recipe_ingredients (recipe_id, canonical_ingredient_id, original_text, quantity, unit) \
         VALUES (3, 1, '2 cups flour', 2.0, 'cup'), (3, NULL, 'a pinch of salt', NULL, NULL), \
                (4, 1, '1 cup flour', 1.0, 'cup')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let recipe = get_recipe(&pool, 3).await.unwrap();

    assert_eq!(recipe.recipe.title, "Recipe 3");
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[0].original_text, "2 cups flour");
    assert_eq!(recipe.ingredients[0].canonical_name.as_deref(), Some("flour"));
    assert_eq!(recipe.ingredients[0].quantity, Some(2.0));
    assert_eq!(recipe.ingredients[1].canonical_name, None);

    let json = serde_json::to_value(&recipe).unwrap();
    assert_eq!(json["title"], "Recipe 3");
    assert_eq!(json["status"], "published");
    assert_eq!(json["ingredients"][0]["canonical_name"], "flour");
}

#[tokio::test]
async fn missing_recipe_is_not_found() {
    let pool = seeded_pool().await;

    let err = get_recipe(&pool, 42).await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound("recipe")));
}
