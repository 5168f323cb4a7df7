//! CRUD and search SQL for company profiles.
//!
//! Partial updates are built from an explicit column allow-list: caller
//! supplied keys select columns from the fixed mapping but are never
//! interpolated into SQL text, and values are always bound parameters
//! with sequentially numbered placeholders.

use std::time::Instant;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::database::manager::DatabaseError;
use crate::database::models::company::{
    CompanyProfile, CompanyStats, CompanyWithOwner, ImageKind, ImageSwap, ImageUrls,
    NewCompanyProfile,
};
use crate::search::query::SELECT_WITH_OWNER;
use crate::search::{PageRequest, SearchFilters, SearchQuery};

/// Columns a partial update may touch. Internal columns (id, owner_id,
/// timestamps) are deliberately absent - unknown keys are ignored, not
/// errors, so callers cannot mass-assign them.
const UPDATABLE_COLUMNS: [&str; 13] = [
    "company_name",
    "address",
    "city",
    "state",
    "country",
    "postal_code",
    "website",
    "logo_url",
    "banner_url",
    "industry",
    "founded_date",
    "description",
    "social_links",
];

const OWNER_UNIQUE_CONSTRAINT: &str = "company_profiles_owner_id_key";
const NAME_UNIQUE_CONSTRAINT: &str = "company_profiles_company_name_lower_idx";

/// Insert a new profile. Unique-constraint violations (owner or name)
/// surface as `Conflict`.
pub async fn create(
    exec: impl PgExecutor<'_>,
    owner_id: Uuid,
    profile: &NewCompanyProfile,
) -> Result<CompanyProfile, DatabaseError> {
    sqlx::query_as::<_, CompanyProfile>(
        r#"
        INSERT INTO company_profiles
            (id, owner_id, company_name, address, city, state, country, postal_code,
             website, logo_url, banner_url, industry, founded_date, description, social_links)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(&profile.company_name)
    .bind(&profile.address)
    .bind(&profile.city)
    .bind(&profile.state)
    .bind(&profile.country)
    .bind(&profile.postal_code)
    .bind(&profile.website)
    .bind(&profile.logo_url)
    .bind(&profile.banner_url)
    .bind(&profile.industry)
    .bind(profile.founded_date)
    .bind(&profile.description)
    .bind(&profile.social_links)
    .fetch_one(exec)
    .await
    .map_err(map_constraint_violation)
}

pub async fn find_by_owner(
    exec: impl PgExecutor<'_>,
    owner_id: Uuid,
) -> Result<Option<CompanyWithOwner>, DatabaseError> {
    let sql = format!("{} WHERE c.owner_id = $1", SELECT_WITH_OWNER);
    let row = sqlx::query_as::<_, CompanyWithOwner>(&sql)
        .bind(owner_id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn find_by_id(
    exec: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<CompanyWithOwner>, DatabaseError> {
    let sql = format!("{} WHERE c.id = $1", SELECT_WITH_OWNER);
    let row = sqlx::query_as::<_, CompanyWithOwner>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

/// Apply a partial update covering only the allow-listed keys present in
/// `patch`. Always refreshes `updated_at`. Fails `InvalidArgument` when
/// nothing in the patch is updatable, `NotFound` when no row matches.
pub async fn update(
    exec: impl PgExecutor<'_>,
    owner_id: Uuid,
    patch: &Map<String, Value>,
) -> Result<CompanyProfile, DatabaseError> {
    let builder = UpdateBuilder::from_patch(patch)?;
    let owner_placeholder = builder.params.len() + 1;
    let sql = format!(
        "UPDATE company_profiles SET {}, \"updated_at\" = now() WHERE \"owner_id\" = ${} RETURNING *",
        builder.assignments.join(", "),
        owner_placeholder
    );

    let mut query = sqlx::query_as::<_, CompanyProfile>(&sql);
    for value in &builder.params {
        query = match value {
            PatchValue::Text(v) => query.bind(v.clone()),
            PatchValue::Date(v) => query.bind(*v),
            PatchValue::Json(v) => query.bind(v.clone()),
        };
    }

    query
        .bind(owner_id)
        .fetch_optional(exec)
        .await
        .map_err(map_constraint_violation)?
        .ok_or_else(|| DatabaseError::NotFound("company profile not found".to_string()))
}

/// Replace a single image slot, returning the row id and the URL the new
/// value superseded. The self-join reads the pre-update row so the old URL
/// survives the statement for cleanup scheduling.
pub async fn update_image_field(
    exec: impl PgExecutor<'_>,
    owner_id: Uuid,
    kind: ImageKind,
    url: &str,
) -> Result<ImageSwap, DatabaseError> {
    let column = kind.column();
    let sql = format!(
        r#"
        UPDATE company_profiles c
        SET "{col}" = $1, "updated_at" = now()
        FROM company_profiles prev
        WHERE c.id = prev.id AND c.owner_id = $2
        RETURNING c.id AS id, prev."{col}" AS previous_url
        "#,
        col = column
    );

    sqlx::query_as::<_, ImageSwap>(&sql)
        .bind(url)
        .bind(owner_id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("company profile not found".to_string()))
}

/// Remove the profile, returning its image URLs so the caller can schedule
/// removal from external storage.
pub async fn delete(
    exec: impl PgExecutor<'_>,
    owner_id: Uuid,
) -> Result<ImageUrls, DatabaseError> {
    sqlx::query_as::<_, ImageUrls>(
        "DELETE FROM company_profiles WHERE owner_id = $1 RETURNING logo_url, banner_url",
    )
    .bind(owner_id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("company profile not found".to_string()))
}

/// Run the data and count queries for a search concurrently; both are
/// independent reads over the same WHERE clause, each on its own pooled
/// connection.
pub async fn search(
    pool: &PgPool,
    filters: &SearchFilters,
    page: &PageRequest,
) -> Result<(Vec<CompanyWithOwner>, i64), DatabaseError> {
    let query = SearchQuery::new(filters, page);
    let data = query.to_data_sql();
    let count = query.to_count_sql();

    let rows_fut = async {
        let mut q = sqlx::query_as::<_, CompanyWithOwner>(&data.query);
        for param in &data.params {
            q = q.bind(param);
        }
        q.fetch_all(pool).await
    };
    let total_fut = async {
        let mut q = sqlx::query_scalar::<_, i64>(&count.query);
        for param in &count.params {
            q = q.bind(param);
        }
        q.fetch_one(pool).await
    };

    let started = Instant::now();
    let (rows, total) = futures::try_join!(rows_fut, total_fut)?;

    let db = &CONFIG.database;
    if db.enable_slow_query_warning && started.elapsed().as_millis() as u64 > db.slow_query_threshold_ms {
        tracing::warn!("slow company search: {}ms", started.elapsed().as_millis());
    }
    Ok((rows, total))
}

/// Case-insensitive name availability check, optionally excluding one
/// owner so a profile can keep its own name on rename.
pub async fn name_available(
    exec: impl PgExecutor<'_>,
    name: &str,
    exclude_owner: Option<Uuid>,
) -> Result<bool, DatabaseError> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM company_profiles
            WHERE lower(company_name) = lower($1)
              AND ($2::uuid IS NULL OR owner_id <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(exclude_owner)
    .fetch_one(exec)
    .await?;
    Ok(!taken)
}

pub async fn stats(exec: impl PgExecutor<'_>) -> Result<CompanyStats, DatabaseError> {
    let stats = sqlx::query_as::<_, CompanyStats>(
        r#"
        SELECT COUNT(*)                                                        AS total_companies,
               COUNT(DISTINCT industry)                                        AS industries,
               COUNT(DISTINCT country)                                         AS countries,
               COUNT(*) FILTER (WHERE created_at >= now() - INTERVAL '30 days') AS created_last_30_days,
               COUNT(*) FILTER (WHERE logo_url IS NOT NULL)                    AS with_logo,
               COUNT(*) FILTER (WHERE logo_url IS NULL)                        AS without_logo,
               COUNT(*) FILTER (WHERE banner_url IS NOT NULL)                  AS with_banner,
               COUNT(*) FILTER (WHERE banner_url IS NULL)                      AS without_banner
        FROM company_profiles
        "#,
    )
    .fetch_one(exec)
    .await?;
    Ok(stats)
}

/// Map unique-constraint violations to `Conflict`; everything else passes
/// through unchanged.
fn map_constraint_violation(err: sqlx::Error) -> DatabaseError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some(c) if c == OWNER_UNIQUE_CONSTRAINT => DatabaseError::Conflict(
                    "company profile already exists for this account".to_string(),
                ),
                Some(c) if c == NAME_UNIQUE_CONSTRAINT => {
                    DatabaseError::Conflict("company name already taken".to_string())
                }
                _ => DatabaseError::Conflict("duplicate value".to_string()),
            };
        }
    }
    DatabaseError::Sqlx(err)
}

enum PatchValue {
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Json(Option<Value>),
}

struct UpdateBuilder {
    assignments: Vec<String>,
    params: Vec<PatchValue>,
}

impl UpdateBuilder {
    /// Walk the allow-list in declaration order and pick up the keys the
    /// patch supplies. Keys outside the list never reach the statement.
    fn from_patch(patch: &Map<String, Value>) -> Result<Self, DatabaseError> {
        let mut builder = Self { assignments: vec![], params: vec![] };

        for column in UPDATABLE_COLUMNS {
            let Some(value) = patch.get(column) else { continue };
            let bound = Self::coerce(column, value)?;
            builder.params.push(bound);
            builder
                .assignments
                .push(format!("\"{}\" = ${}", column, builder.params.len()));
        }

        if builder.assignments.is_empty() {
            return Err(DatabaseError::InvalidArgument(
                "no updatable fields in payload".to_string(),
            ));
        }
        Ok(builder)
    }

    fn coerce(column: &str, value: &Value) -> Result<PatchValue, DatabaseError> {
        match column {
            "founded_date" => match value {
                Value::Null => Ok(PatchValue::Date(None)),
                Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(|d| PatchValue::Date(Some(d)))
                    .map_err(|_| {
                        DatabaseError::InvalidArgument(format!(
                            "founded_date must be YYYY-MM-DD, got '{}'",
                            s
                        ))
                    }),
                _ => Err(DatabaseError::InvalidArgument(
                    "founded_date must be a date string or null".to_string(),
                )),
            },
            "social_links" => match value {
                Value::Null => Ok(PatchValue::Json(None)),
                Value::Object(_) => Ok(PatchValue::Json(Some(value.clone()))),
                _ => Err(DatabaseError::InvalidArgument(
                    "social_links must be an object or null".to_string(),
                )),
            },
            _ => match value {
                Value::Null => Ok(PatchValue::Text(None)),
                Value::String(s) => Ok(PatchValue::Text(Some(s.clone()))),
                _ => Err(DatabaseError::InvalidArgument(format!(
                    "field '{}' must be a string or null",
                    column
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test patch must be an object")
    }

    #[test]
    fn builder_covers_only_supplied_allow_listed_keys() {
        let builder =
            UpdateBuilder::from_patch(&patch(json!({ "city": "Pune", "website": null }))).unwrap();
        assert_eq!(builder.assignments, vec!["\"city\" = $1", "\"website\" = $2"]);
        assert_eq!(builder.params.len(), 2);
    }

    #[test]
    fn builder_ignores_internal_columns() {
        // owner_id is not in the allow-list: silently dropped, city survives
        let builder =
            UpdateBuilder::from_patch(&patch(json!({ "owner_id": 999, "city": "Pune" }))).unwrap();
        assert_eq!(builder.assignments, vec!["\"city\" = $1"]);
    }

    #[test]
    fn builder_rejects_patch_with_no_updatable_fields() {
        let err = UpdateBuilder::from_patch(&patch(json!({ "owner_id": 999, "id": "x" })))
            .err()
            .expect("expected InvalidArgument");
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));

        let err = UpdateBuilder::from_patch(&patch(json!({}))).err().unwrap();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));
    }

    #[test]
    fn builder_numbers_placeholders_sequentially() {
        let builder = UpdateBuilder::from_patch(&patch(json!({
            "company_name": "Acme",
            "industry": "tech",
            "description": "makers of things"
        })))
        .unwrap();
        // Allow-list order, not payload order
        assert_eq!(
            builder.assignments,
            vec!["\"company_name\" = $1", "\"industry\" = $2", "\"description\" = $3"]
        );
    }

    #[test]
    fn founded_date_requires_iso_format() {
        let ok = UpdateBuilder::from_patch(&patch(json!({ "founded_date": "2001-06-01" })));
        assert!(ok.is_ok());

        let err = UpdateBuilder::from_patch(&patch(json!({ "founded_date": "01/06/2001" })))
            .err()
            .unwrap();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));

        let cleared = UpdateBuilder::from_patch(&patch(json!({ "founded_date": null }))).unwrap();
        assert!(matches!(cleared.params[0], PatchValue::Date(None)));
    }

    #[test]
    fn social_links_must_be_object_or_null() {
        let ok = UpdateBuilder::from_patch(&patch(
            json!({ "social_links": { "linkedin": "https://linkedin.com/company/acme" } }),
        ));
        assert!(ok.is_ok());

        let err =
            UpdateBuilder::from_patch(&patch(json!({ "social_links": "not-a-map" }))).err().unwrap();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));
    }

    #[test]
    fn text_fields_reject_non_string_values() {
        let err = UpdateBuilder::from_patch(&patch(json!({ "city": 42 }))).err().unwrap();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));
    }
}
