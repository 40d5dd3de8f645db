use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{self, FieldErrors, not_blank};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(id: Uuid, input: NewCategory, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            created_at,
            updated_at: None,
        }
    }

    /// Overwrites the provided fields; stamps `updated_at` only when something was provided.
    pub fn apply(&mut self, changes: CategoryChanges, now: DateTime<Utc>) {
        if changes.is_empty() {
            return;
        }

        if let Some(name) = changes.name {
            self.name = name;
        }

        if let Some(description) = changes.description {
            self.description = Some(description);
        }

        self.updated_at = Some(now);
    }
}

/// A create payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// The fields of an update payload that passed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(
        required(message = "is required"),
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl CreateCategoryRequest {
    pub fn validate_create(self) -> Result<NewCategory, FieldErrors> {
        validation::validate(&self)?;

        Ok(NewCategory {
            name: validation::required(self.name, "name")?,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate_update(self) -> Result<CategoryChanges, FieldErrors> {
        validation::validate(&self)?;

        Ok(CategoryChanges {
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryFilter {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Outbound projection of a [`Category`]. Products are listed separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        category.clone().into()
    }
}

impl From<CategoryResponse> for Category {
    fn from(response: CategoryResponse) -> Self {
        Self {
            id: response.id,
            name: response.name,
            description: response.description,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: Option<&str>) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn create_accepts_named_category() {
        let input = create(Some("Hardware")).validate_create().unwrap();
        assert_eq!(input.name, "Hardware");
        assert_eq!(input.description, None);
    }

    #[test]
    fn create_requires_name() {
        let errors = create(None).validate_create().unwrap_err();
        assert!(errors.contains_field("name"));

        let errors = create(Some("  ")).validate_create().unwrap_err();
        assert!(errors.contains_field("name"));
    }

    #[test]
    fn create_bounds_name_length() {
        let long = "x".repeat(101);
        let errors = create(Some(&long)).validate_create().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_field("name"));

        assert!(create(Some(&"x".repeat(100))).validate_create().is_ok());
    }

    #[test]
    fn update_allows_empty_payload() {
        let changes = UpdateCategoryRequest::default().validate_update().unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn update_rejects_blank_name() {
        let errors = UpdateCategoryRequest {
            name: Some(String::new()),
            description: None,
        }
        .validate_update()
        .unwrap_err();
        assert!(errors.contains_field("name"));
    }

    #[test]
    fn apply_overwrites_only_provided_fields() {
        let created = Utc::now();
        let mut category = Category::new(
            Uuid::new_v4(),
            NewCategory {
                name: "Tools".to_string(),
                description: Some("Hand tools".to_string()),
            },
            created,
        );

        category.apply(CategoryChanges::default(), Utc::now());
        assert_eq!(category.updated_at, None);

        let now = Utc::now();
        category.apply(
            CategoryChanges {
                name: Some("Power tools".to_string()),
                description: None,
            },
            now,
        );
        assert_eq!(category.name, "Power tools");
        assert_eq!(category.description.as_deref(), Some("Hand tools"));
        assert_eq!(category.created_at, created);
        assert_eq!(category.updated_at, Some(now));
    }

    #[test]
    fn response_mapping_is_lossless() {
        let category = Category {
            id: Uuid::new_v4(),
            name: "Garden".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Some(Utc::now()),
        };

        let response = CategoryResponse::from(&category);
        assert_eq!(Category::from(response.clone()), category);
        assert_eq!(CategoryResponse::from(Category::from(response.clone())), response);
    }
}
