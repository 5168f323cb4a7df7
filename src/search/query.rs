use super::types::{PageRequest, SearchFilters, SqlResult};

/// Columns selected for profile reads: the full row plus owner display
/// fields from the joined account record.
pub(crate) const SELECT_WITH_OWNER: &str = "SELECT c.*, u.email AS owner_email, u.mobile_no AS owner_mobile_no \
     FROM company_profiles c LEFT JOIN users u ON u.id = c.owner_id";

const COUNT_FROM: &str = "SELECT COUNT(*) FROM company_profiles c";

/// Builds the data/count query pair for a company search. Both share one
/// WHERE clause; every value is a bound parameter with a sequentially
/// numbered placeholder, and column names only ever come from the fixed
/// predicate set and the sort allow-list.
pub struct SearchQuery {
    where_sql: String,
    params: Vec<String>,
    order_sql: String,
    limit: i64,
    offset: i64,
}

impl SearchQuery {
    pub fn new(filters: &SearchFilters, page: &PageRequest) -> Self {
        let mut where_builder = WhereBuilder::default();

        if let Some(term) = non_empty(&filters.search) {
            where_builder.name_or_description(term);
        }
        if let Some(term) = non_empty(&filters.industry) {
            where_builder.substring("industry", term);
        }
        if let Some(term) = non_empty(&filters.city) {
            where_builder.substring("city", term);
        }
        if let Some(term) = non_empty(&filters.state) {
            where_builder.substring("state", term);
        }
        if let Some(term) = non_empty(&filters.country) {
            where_builder.substring("country", term);
        }

        let (where_sql, params) = where_builder.build();

        // Primary key as secondary sort key keeps pagination reproducible
        // when sort values collide
        let order_sql = format!(
            "ORDER BY c.\"{}\" {}, c.\"id\" {}",
            page.sort_by.column(),
            page.sort_order.to_sql(),
            page.sort_order.to_sql()
        );

        Self {
            where_sql,
            params,
            order_sql,
            limit: page.limit,
            offset: page.offset(),
        }
    }

    pub fn to_data_sql(&self) -> SqlResult {
        let query = [
            SELECT_WITH_OWNER.to_string(),
            self.where_sql.clone(),
            self.order_sql.clone(),
            format!("LIMIT {} OFFSET {}", self.limit, self.offset),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.params.clone() }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let query = [COUNT_FROM.to_string(), self.where_sql.clone()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        SqlResult { query, params: self.params.clone() }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Default)]
struct WhereBuilder {
    predicates: Vec<String>,
    params: Vec<String>,
}

impl WhereBuilder {
    fn param(&mut self, value: String) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn substring(&mut self, column: &str, term: &str) {
        let placeholder = self.param(format!("%{}%", term));
        self.predicates.push(format!("c.\"{}\" ILIKE {}", column, placeholder));
    }

    fn name_or_description(&mut self, term: &str) {
        let pattern = format!("%{}%", term);
        let name = self.param(pattern.clone());
        let description = self.param(pattern);
        self.predicates.push(format!(
            "(c.\"company_name\" ILIKE {} OR c.\"description\" ILIKE {})",
            name, description
        ));
    }

    fn build(self) -> (String, Vec<String>) {
        if self.predicates.is_empty() {
            (String::new(), self.params)
        } else {
            (format!("WHERE {}", self.predicates.join(" AND ")), self.params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::{PageRequest, SortDirection, SortKey};

    fn page(page: i64, limit: i64) -> PageRequest {
        PageRequest::new(Some(page), Some(limit), None, None)
    }

    #[test]
    fn empty_filters_build_no_where_clause() {
        let q = SearchQuery::new(&SearchFilters::default(), &page(1, 10));
        let data = q.to_data_sql();
        assert!(!data.query.contains("WHERE"));
        assert!(data.query.ends_with("LIMIT 10 OFFSET 0"));
        assert!(data.params.is_empty());

        let count = q.to_count_sql();
        assert_eq!(count.query, "SELECT COUNT(*) FROM company_profiles c");
    }

    #[test]
    fn filters_compose_conjunctively_with_numbered_params() {
        let filters = SearchFilters {
            industry: Some("tech".into()),
            city: Some("Pune".into()),
            ..Default::default()
        };
        let q = SearchQuery::new(&filters, &page(1, 10));
        let data = q.to_data_sql();
        assert!(data.query.contains("c.\"industry\" ILIKE $1 AND c.\"city\" ILIKE $2"));
        assert_eq!(data.params, vec!["%tech%", "%Pune%"]);

        // The count query shares the WHERE clause and parameters
        let count = q.to_count_sql();
        assert!(count.query.contains("WHERE c.\"industry\" ILIKE $1 AND c.\"city\" ILIKE $2"));
        assert_eq!(count.params, data.params);
    }

    #[test]
    fn search_term_matches_name_or_description() {
        let filters = SearchFilters { search: Some("acme".into()), ..Default::default() };
        let q = SearchQuery::new(&filters, &page(1, 10));
        let data = q.to_data_sql();
        assert!(data
            .query
            .contains("(c.\"company_name\" ILIKE $1 OR c.\"description\" ILIKE $2)"));
        assert_eq!(data.params, vec!["%acme%", "%acme%"]);
    }

    #[test]
    fn whitespace_only_filters_are_skipped() {
        let filters = SearchFilters {
            search: Some("   ".into()),
            country: Some("".into()),
            ..Default::default()
        };
        let q = SearchQuery::new(&filters, &page(1, 10));
        assert!(!q.to_data_sql().query.contains("WHERE"));
    }

    #[test]
    fn order_by_uses_allow_listed_key_with_id_tie_break() {
        let req = PageRequest::new(Some(1), Some(10), Some("company_name"), Some("asc"));
        assert_eq!(req.sort_by, SortKey::CompanyName);
        assert_eq!(req.sort_order, SortDirection::Asc);
        let q = SearchQuery::new(&SearchFilters::default(), &req);
        assert!(q.to_data_sql().query.contains("ORDER BY c.\"company_name\" ASC, c.\"id\" ASC"));
    }

    #[test]
    fn disallowed_sort_key_falls_back_to_created_at() {
        let req = PageRequest::new(Some(1), Some(10), Some("password"), None);
        let q = SearchQuery::new(&SearchFilters::default(), &req);
        assert!(q.to_data_sql().query.contains("ORDER BY c.\"created_at\" DESC, c.\"id\" DESC"));
    }

    #[test]
    fn offset_math_follows_page_number() {
        let q = SearchQuery::new(&SearchFilters::default(), &page(3, 10));
        assert!(q.to_data_sql().query.ends_with("LIMIT 10 OFFSET 20"));
    }
}
