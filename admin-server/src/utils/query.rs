//! List query validation
//!
//! Turns the raw [`PageQuery`] of a list endpoint into a [`ListQuery`] whose
//! ORDER BY column comes from a per-resource allow list, never from the
//! request text.

use serde::Serialize;
use shared::models::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageQuery};

use crate::utils::AppError;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Sortable fields of one resource
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    /// `(api field name, SQL column)`; api names are matched case-insensitively
    pub fields: &'static [(&'static str, &'static str)],
    pub default_field: &'static str,
    pub default_desc: bool,
}

impl SortSpec {
    fn column(&self, field: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, column)| *column)
    }
}

pub const ROLE_SORT: SortSpec = SortSpec {
    fields: &[
        ("name", "r.name"),
        ("description", "r.description"),
        ("isactive", "r.is_active"),
        ("createdon", "r.created_at"),
    ],
    default_field: "name",
    default_desc: false,
};

pub const USER_SORT: SortSpec = SortSpec {
    fields: &[
        ("createdon", "u.created_at"),
        ("name", "u.first_name"),
        ("email", "u.email"),
        ("phone", "u.phone"),
        ("isactive", "u.is_active"),
        ("role", "r.name"),
    ],
    default_field: "createdon",
    default_desc: true,
};

pub const CMS_SORT: SortSpec = SortSpec {
    fields: &[
        ("createdon", "created_at"),
        ("title", "title"),
        ("key", "key"),
        ("metakeyword", "meta_keyword"),
        ("isactive", "is_active"),
    ],
    default_field: "createdon",
    default_desc: false,
};

pub const EMAIL_TEMPLATE_SORT: SortSpec = SortSpec {
    fields: &[
        ("key", "key"),
        ("title", "title"),
        ("subject", "subject"),
        ("isactive", "is_active"),
        ("createdon", "created_at"),
    ],
    default_field: "key",
    default_desc: false,
};

pub const AUDIT_LOG_SORT: SortSpec = SortSpec {
    fields: &[
        ("username", "user_name"),
        ("type", "type"),
        ("activity", "activity"),
        ("timestamp", "timestamp"),
    ],
    default_field: "timestamp",
    default_desc: true,
};

/// Validated paging and sorting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub order_by: &'static str,
    pub descending: bool,
}

impl ListQuery {
    pub fn parse(query: &PageQuery, spec: &SortSpec) -> Result<Self, AppError> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(AppError::validation("Page number must be greater than 0.")
                .with_detail("page", page));
        }

        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::validation("Page size must be between 1 and 100.")
                .with_detail("page_size", page_size));
        }

        let field = query
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(spec.default_field);
        let order_by = spec.column(field).ok_or_else(|| {
            AppError::validation("Invalid sort field.").with_detail("sort_by", field)
        })?;

        let descending = match query
            .sort_direction
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            None => spec.default_desc,
            Some(d) if d.eq_ignore_ascii_case("asc") => false,
            Some(d) if d.eq_ignore_ascii_case("desc") => true,
            Some(d) => {
                return Err(
                    AppError::validation("Invalid sort direction.").with_detail("sort_direction", d)
                );
            }
        };

        Ok(Self {
            page,
            page_size,
            order_by,
            descending,
        })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// `ORDER BY` clause body, e.g. `r.name ASC`
    pub fn order_clause(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {direction}", self.order_by)
    }
}
