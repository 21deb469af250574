//! Category models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product category. Categories are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a category.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    #[serde(alias = "categoryName")]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl CreateCategoryRequest {
    /// Trimmed name and description, with an empty description dropped.
    pub fn normalized(&self) -> (String, Option<String>) {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        (self.name.trim().to_string(), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let request = CreateCategoryRequest {
            name: "   ".to_string(),
            description: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_long_name_rejected() {
        let request = CreateCategoryRequest {
            name: "x".repeat(101),
            description: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_normalized() {
        let request = CreateCategoryRequest {
            name: "  Office Supplies ".to_string(),
            description: Some("  ".to_string()),
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            request.normalized(),
            ("Office Supplies".to_string(), None)
        );
    }

    #[test]
    fn test_deserialize() {
        let request: CreateCategoryRequest =
            serde_json::from_str(r#"{"name":"Electronics","description":"Devices"}"#).unwrap();
        assert_eq!(request.name, "Electronics");
        assert_eq!(request.description.as_deref(), Some("Devices"));
    }
}
