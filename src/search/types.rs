use serde::{Deserialize, Serialize};

use crate::config::CONFIG;

/// Optional case-insensitive substring filters. `search` matches against
/// company name or description; the rest match their own column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Columns eligible for ORDER BY. Anything outside this set falls back to
/// `created_at` - sort keys never come from caller-controlled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CompanyName,
    City,
    State,
    Country,
    Industry,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("company_name") => SortKey::CompanyName,
            Some("city") => SortKey::City,
            Some("state") => SortKey::State,
            Some("country") => SortKey::Country,
            Some("industry") => SortKey::Industry,
            Some("created_at") => SortKey::CreatedAt,
            Some("updated_at") => SortKey::UpdatedAt,
            _ => SortKey::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CompanyName => "company_name",
            SortKey::City => "city",
            SortKey::State => "state",
            SortKey::Country => "country",
            SortKey::Industry => "industry",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Normalized pagination request: page >= 1, limit clamped to the
/// configured cap, sort validated against the allow-list.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortKey,
    pub sort_order: SortDirection,
}

impl PageRequest {
    pub fn new(
        page: Option<i64>,
        limit: Option<i64>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Self {
        let search = &CONFIG.search;
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(search.default_limit).clamp(1, search.max_limit),
            sort_by: SortKey::parse(sort_by),
            sort_order: SortDirection::parse(sort_order),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

/// Page metadata derived from the count query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// A built statement plus its bound parameter values, in placeholder order
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_falls_back_to_created_at() {
        assert_eq!(SortKey::parse(Some("company_name")), SortKey::CompanyName);
        assert_eq!(SortKey::parse(Some("updated_at")), SortKey::UpdatedAt);
        // Not allow-listed: internal columns and arbitrary text
        assert_eq!(SortKey::parse(Some("password")), SortKey::CreatedAt);
        assert_eq!(SortKey::parse(Some("owner_id")), SortKey::CreatedAt);
        assert_eq!(SortKey::parse(None), SortKey::CreatedAt);
    }

    #[test]
    fn sort_direction_defaults_to_desc() {
        assert_eq!(SortDirection::parse(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("sideways")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(None), SortDirection::Desc);
    }

    #[test]
    fn page_request_clamps_inputs() {
        let req = PageRequest::new(Some(0), Some(500), None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 50);

        let req = PageRequest::new(Some(-3), Some(0), None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 1);

        let req = PageRequest::new(Some(3), Some(10), None, None);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn page_info_math() {
        // 25 matching rows, limit 10
        let first = PageInfo::new(1, 10, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let last = PageInfo::new(3, 10, 25);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let past_end = PageInfo::new(4, 10, 25);
        assert!(!past_end.has_next_page);
        assert!(past_end.has_prev_page);
    }

    #[test]
    fn page_info_empty_result_set() {
        let info = PageInfo::new(1, 10, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next_page);
        assert!(!info.has_prev_page);
    }
}
