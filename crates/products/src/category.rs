use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wholesale_core::{CategoryId, DomainError, DomainResult};

/// Product category; the unit of sales permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Command: CreateCategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub category_id: CategoryId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

impl Category {
    /// Validate the command and build the category.
    ///
    /// `existing` is the current category list; names are unique ignoring case.
    pub fn create(cmd: &CreateCategory, existing: &[Category]) -> DomainResult<Category> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        if existing
            .iter()
            .any(|c| c.name.to_lowercase() == name.to_lowercase())
        {
            return Err(DomainError::conflict(format!(
                "a category with the name '{name}' already exists"
            )));
        }
        Ok(Category {
            id: cmd.category_id,
            name: name.to_string(),
            created_at: cmd.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(name: &str) -> CreateCategory {
        CreateCategory {
            category_id: CategoryId::new(),
            name: name.to_string(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn names_are_trimmed() {
        let c = Category::create(&cmd("  Beverages "), &[]).unwrap();
        assert_eq!(c.name, "Beverages");
    }

    #[test]
    fn duplicate_names_conflict_ignoring_case() {
        let existing = vec![Category::create(&cmd("Snacks"), &[]).unwrap()];
        let err = Category::create(&cmd("SNACKS"), &existing).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Category::create(&cmd("   "), &[]),
            Err(DomainError::Validation(_))
        ));
    }
}
