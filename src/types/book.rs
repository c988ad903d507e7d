use serde::Deserialize;

use crate::error::BookstoreError;
use crate::types::nullable;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub like_count: Option<i64>,
    pub category_id: i64,
}

/// Partial update; absent fields keep their stored value. The nullable
/// columns accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub isbn: Option<Option<String>>,
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub cover_url: Option<Option<String>>,
    pub like_count: Option<i64>,
    pub category_id: Option<i64>,
}

fn require_text(field: &str, value: &str) -> Result<(), BookstoreError> {
    if value.trim().is_empty() {
        return Err(BookstoreError::validation(format!("{field} should not be empty")));
    }
    Ok(())
}

fn require_positive_price(price: f64) -> Result<(), BookstoreError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(BookstoreError::validation("price must be a positive number"));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: i64) -> Result<(), BookstoreError> {
    if value < 0 {
        return Err(BookstoreError::validation(format!(
            "{field} must not be less than 0"
        )));
    }
    Ok(())
}

impl CreateBook {
    pub fn validate(&self) -> Result<(), BookstoreError> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        require_positive_price(self.price)?;
        if let Some(stock) = self.stock {
            require_non_negative("stock", stock)?;
        }
        if let Some(likes) = self.like_count {
            require_non_negative("likeCount", likes)?;
        }
        Ok(())
    }
}

impl UpdateBook {
    pub fn validate(&self) -> Result<(), BookstoreError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        if let Some(price) = self.price {
            require_positive_price(price)?;
        }
        if let Some(stock) = self.stock {
            require_non_negative("stock", stock)?;
        }
        if let Some(likes) = self.like_count {
            require_non_negative("likeCount", likes)?;
        }
        Ok(())
    }
}
