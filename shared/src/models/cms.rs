//! CMS Page Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{self, Normalize};

/// CMS page row. `key` is fixed once the page exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CmsPage {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub meta_keyword: String,
    pub meta_title: String,
    pub meta_description: String,
    pub content: String,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_by: Option<i64>,
    pub updated_at: Option<i64>,
}

/// CMS list row (without content)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CmsListItem {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub meta_keyword: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create CMS page payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CmsCreate {
    #[validate(custom(function = "validation::validate_key"))]
    pub key: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub title: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub meta_keyword: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub meta_title: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub meta_description: String,
    #[validate(custom(function = "validation::validate_body"))]
    pub content: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Update CMS page payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CmsUpdate {
    #[validate(custom(function = "validation::validate_words"))]
    pub title: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub meta_keyword: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub meta_title: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub meta_description: String,
    #[validate(custom(function = "validation::validate_body"))]
    pub content: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Normalize for CmsCreate {
    fn normalize(&mut self) {
        validation::trim(&mut self.key);
        validation::trim(&mut self.title);
        validation::trim(&mut self.meta_keyword);
        validation::trim(&mut self.meta_title);
        validation::trim(&mut self.meta_description);
        validation::trim(&mut self.content);
    }
}

impl Normalize for CmsUpdate {
    fn normalize(&mut self) {
        validation::trim(&mut self.title);
        validation::trim(&mut self.meta_keyword);
        validation::trim(&mut self.meta_title);
        validation::trim(&mut self.meta_description);
        validation::trim(&mut self.content);
    }
}

/// CMS list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmsFilter {
    pub title: Option<String>,
    pub key: Option<String>,
    pub meta_keyword: Option<String>,
    pub is_active: Option<bool>,
}

impl Normalize for CmsFilter {
    fn normalize(&mut self) {
        validation::trim_opt(&mut self.title);
        validation::trim_opt(&mut self.key);
        validation::trim_opt(&mut self.meta_keyword);
    }
}
