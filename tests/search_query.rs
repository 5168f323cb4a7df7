// Exercises the search/pagination engine through the public API. These
// tests build SQL only; nothing here needs a database.

use registry_api::search::{PageInfo, PageRequest, SearchFilters, SearchQuery};

#[test]
fn full_search_request_builds_bounded_query_pair() {
    let filters = SearchFilters {
        search: Some("acme".to_string()),
        industry: Some("tech".to_string()),
        city: Some("Pune".to_string()),
        ..Default::default()
    };
    let page = PageRequest::new(Some(2), Some(20), Some("company_name"), Some("asc"));
    let query = SearchQuery::new(&filters, &page);

    let data = query.to_data_sql();
    assert!(data.query.starts_with("SELECT c.*"));
    assert!(data.query.contains(
        "WHERE (c.\"company_name\" ILIKE $1 OR c.\"description\" ILIKE $2) \
         AND c.\"industry\" ILIKE $3 AND c.\"city\" ILIKE $4"
    ));
    assert!(data.query.contains("ORDER BY c.\"company_name\" ASC, c.\"id\" ASC"));
    assert!(data.query.ends_with("LIMIT 20 OFFSET 20"));
    assert_eq!(data.params, vec!["%acme%", "%acme%", "%tech%", "%Pune%"]);

    // Count query: same predicates and parameters, no ordering or paging
    let count = query.to_count_sql();
    assert!(count.query.starts_with("SELECT COUNT(*)"));
    assert!(!count.query.contains("ORDER BY"));
    assert!(!count.query.contains("LIMIT"));
    assert_eq!(count.params, data.params);
}

#[test]
fn defaults_apply_when_nothing_is_specified() {
    let page = PageRequest::default();
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);

    let query = SearchQuery::new(&SearchFilters::default(), &page);
    let data = query.to_data_sql();
    assert!(!data.query.contains("WHERE"));
    assert!(data.query.contains("ORDER BY c.\"created_at\" DESC, c.\"id\" DESC"));
    assert!(data.query.ends_with("LIMIT 10 OFFSET 0"));
}

#[test]
fn hostile_sort_input_is_neutralized_not_rejected() {
    // A non-allow-listed sort key falls back to created_at; the raw text
    // never reaches the statement.
    let page = PageRequest::new(
        Some(1),
        Some(10),
        Some("password; DROP TABLE company_profiles"),
        Some("DESC; --"),
    );
    let query = SearchQuery::new(&SearchFilters::default(), &page);
    let data = query.to_data_sql();
    assert!(data.query.contains("ORDER BY c.\"created_at\" DESC"));
    assert!(!data.query.contains("DROP TABLE"));
}

#[test]
fn limit_is_clamped_to_the_configured_cap() {
    let page = PageRequest::new(Some(1), Some(10_000), None, None);
    assert_eq!(page.limit, 50);

    let query = SearchQuery::new(&SearchFilters::default(), &page);
    assert!(query.to_data_sql().query.ends_with("LIMIT 50 OFFSET 0"));
}

#[test]
fn page_metadata_matches_expected_shape_for_25_rows() {
    let pages: Vec<PageInfo> =
        (1..=4).map(|p| PageInfo::new(p, 10, 25)).collect();

    assert_eq!(pages[0].total_pages, 3);
    assert!(pages[0].has_next_page && !pages[0].has_prev_page);
    assert!(pages[1].has_next_page && pages[1].has_prev_page);
    assert!(!pages[2].has_next_page && pages[2].has_prev_page);
    // Page 4 is past the end: still well-formed, nothing next
    assert!(!pages[3].has_next_page && pages[3].has_prev_page);
}
