use serde::Deserialize;

use crate::error::BookstoreError;
use crate::types::nullable;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<(), BookstoreError> {
        if self.name.trim().is_empty() {
            return Err(BookstoreError::validation("name should not be empty"));
        }
        Ok(())
    }
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<(), BookstoreError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(BookstoreError::validation("name should not be empty"));
        }
        Ok(())
    }
}
