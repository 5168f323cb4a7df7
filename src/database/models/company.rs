use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A company profile row. Exactly one per owning account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub company_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub industry: Option<String>,
    pub founded_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub social_links: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyProfile {
    /// Share of profile fields that are populated, as a whole percentage
    pub fn completion_percent(&self) -> u8 {
        let fields = [
            !self.company_name.trim().is_empty(),
            self.address.is_some(),
            self.city.is_some(),
            self.state.is_some(),
            self.country.is_some(),
            self.postal_code.is_some(),
            self.website.is_some(),
            self.logo_url.is_some(),
            self.banner_url.is_some(),
            self.industry.is_some(),
            self.founded_date.is_some(),
            self.description.is_some(),
            self.social_links.is_some(),
        ];
        let filled = fields.iter().filter(|f| **f).count();
        ((filled * 100) / fields.len()) as u8
    }
}

/// Profile joined with owner display fields from `users`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub owner_email: Option<String>,
    pub owner_mobile_no: Option<String>,
}

/// Creation payload. Field validation (name characters, date not in the
/// future, description length) happens upstream of the data service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompanyProfile {
    pub company_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub founded_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub social_links: Option<serde_json::Value>,
}

/// The two image slots a profile carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Logo,
    Banner,
}

impl ImageKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logo" => Some(ImageKind::Logo),
            "banner" => Some(ImageKind::Banner),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            ImageKind::Logo => "logo_url",
            ImageKind::Banner => "banner_url",
        }
    }
}

/// Result of an image slot update: row id plus the URL the new value
/// superseded, retained so the caller can schedule its removal
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ImageSwap {
    pub id: Uuid,
    pub previous_url: Option<String>,
}

/// Image URLs returned by profile deletion for external cleanup
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ImageUrls {
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
}

/// Aggregate registry counts (SQL computed)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompanyStats {
    pub total_companies: i64,
    pub industries: i64,
    pub countries: i64,
    pub created_last_30_days: i64,
    pub with_logo: i64,
    pub without_logo: i64,
    pub with_banner: i64,
    pub without_banner: i64,
}
