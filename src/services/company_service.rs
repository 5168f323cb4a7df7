//! Business invariants and transaction orchestration for company
//! profiles.
//!
//! Every multi-step mutation runs inside a single sqlx transaction;
//! dropping the transaction on an early return rolls it back, so the
//! pooled connection is released on every exit path and partial writes
//! are never observable.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::company_repository as repo;
use crate::database::manager::DatabaseError;
use crate::database::models::company::{
    CompanyProfile, CompanyStats, CompanyWithOwner, ImageKind, ImageSwap, ImageUrls,
    NewCompanyProfile,
};
use crate::media::CleanupQueue;
use crate::search::{PageInfo, PageRequest, SearchFilters};

/// Read model decorated with derived fields
#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfileView {
    #[serde(flatten)]
    pub company: CompanyWithOwner,
    pub profile_completion: u8,
}

impl From<CompanyWithOwner> for CompanyProfileView {
    fn from(company: CompanyWithOwner) -> Self {
        let profile_completion = company.profile.completion_percent();
        Self { company, profile_completion }
    }
}

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
    cleanup: CleanupQueue,
}

impl CompanyService {
    pub fn new(pool: PgPool, cleanup: CleanupQueue) -> Self {
        Self { pool, cleanup }
    }

    /// Create the caller's profile. The in-transaction existence check
    /// gives a friendly message; the UNIQUE constraint on owner_id is the
    /// authoritative guard, so a racing duplicate insert still fails with
    /// `Conflict` rather than slipping through.
    pub async fn create_company_profile(
        &self,
        owner_id: Uuid,
        profile: NewCompanyProfile,
    ) -> Result<CompanyProfile, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if repo::find_by_owner(&mut *tx, owner_id).await?.is_some() {
            return Err(DatabaseError::Conflict(
                "company profile already exists for this account".to_string(),
            ));
        }

        let created = repo::create(&mut *tx, owner_id, &profile).await?;
        tx.commit().await?;
        Ok(created)
    }

    pub async fn get_company_profile(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<CompanyProfileView>, DatabaseError> {
        let company = repo::find_by_owner(&self.pool, owner_id).await?;
        Ok(company.map(CompanyProfileView::from))
    }

    pub async fn get_company_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CompanyProfileView>, DatabaseError> {
        let company = repo::find_by_id(&self.pool, id).await?;
        Ok(company.map(CompanyProfileView::from))
    }

    /// Partial update of the caller's profile; only allow-listed keys in
    /// the patch are applied.
    pub async fn update_company_profile(
        &self,
        owner_id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<CompanyProfile, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if repo::find_by_owner(&mut *tx, owner_id).await?.is_none() {
            return Err(DatabaseError::NotFound("company profile not found".to_string()));
        }

        let updated = repo::update(&mut *tx, owner_id, &patch).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Swap one image slot. Single-row single-column write, so no explicit
    /// transaction; the superseded URL is queued for removal afterwards.
    pub async fn update_company_image(
        &self,
        owner_id: Uuid,
        kind: ImageKind,
        url: String,
    ) -> Result<ImageSwap, DatabaseError> {
        let swap = repo::update_image_field(&self.pool, owner_id, kind, &url).await?;

        if let Some(previous) = swap.previous_url.clone() {
            if previous != url {
                self.cleanup.enqueue(previous);
            }
        }
        Ok(swap)
    }

    /// Delete the caller's profile. Image cleanup is enqueued only after
    /// the transaction commits and never blocks the response.
    pub async fn delete_company_profile(&self, owner_id: Uuid) -> Result<ImageUrls, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let images = repo::delete(&mut *tx, owner_id).await?;
        tx.commit().await?;

        if let Some(url) = images.logo_url.clone() {
            self.cleanup.enqueue(url);
        }
        if let Some(url) = images.banner_url.clone() {
            self.cleanup.enqueue(url);
        }
        Ok(images)
    }

    pub async fn search_companies(
        &self,
        filters: &SearchFilters,
        page: &PageRequest,
    ) -> Result<(Vec<CompanyWithOwner>, PageInfo), DatabaseError> {
        let (rows, total) = repo::search(&self.pool, filters, page).await?;
        Ok((rows, PageInfo::new(page.page, page.limit, total)))
    }

    pub async fn company_stats(&self) -> Result<CompanyStats, DatabaseError> {
        repo::stats(&self.pool).await
    }

    pub async fn is_name_available(
        &self,
        name: &str,
        exclude_owner: Option<Uuid>,
    ) -> Result<bool, DatabaseError> {
        repo::name_available(&self.pool, name, exclude_owner).await
    }
}
