//! Recipe rows and the recipe status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;

/// Processing state of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStatus {
    /// Images uploaded, extraction in progress.
    Processing,
    /// Extraction finished with fields that need a human check.
    ReviewRequired,
    /// Visible to readers.
    Published,
}

impl RecipeStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Processing, Self::ReviewRequired, Self::Published];

    /// Returns the value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::ReviewRequired => "review_required",
            Self::Published => "published",
        }
    }

    /// Looks up a status by its stored value.
    #[must_use]
    pub fn lookup(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| StoreError::InvalidStatus(s.to_string()))
    }
}

/// A recipe row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    pub status: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Returns the parsed status, or `None` for a value outside the
    /// lifecycle.
    #[must_use]
    pub fn parsed_status(&self) -> Option<RecipeStatus> {
        RecipeStatus::lookup(&self.status)
    }
}

/// An ingredient line of a recipe, joined with its canonical name.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_ingredient_id: Option<i64>,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recipe together with its ingredients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in RecipeStatus::ALL {
            assert_eq!(status.as_str().parse::<RecipeStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(RecipeStatus::lookup("draft"), None);
        assert_eq!(RecipeStatus::lookup("Published"), None);
        let err = "published'; DROP TABLE recipes;--"
            .parse::<RecipeStatus>()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidStatus(_)));
    }

    #[test]
    fn test_status_serializes_as_column_value() {
        let json = serde_json::to_string(&RecipeStatus::ReviewRequired).unwrap();
        assert_eq!(json, "\"review_required\"");
    }
}
