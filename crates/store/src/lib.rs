use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        CaseStudy, CaseStudyId, ContactId, ContactStatus, ContactSubmission, PortfolioItem,
        PortfolioItemId, Testimonial, TestimonialId,
    },
    error::StoreError,
};

pub mod config;
pub mod memory;

pub use config::{load_settings, Settings};
pub use memory::MemoryStore;

pub const TESTIMONIALS_TABLE: &str = "landing_testimonials";
pub const PORTFOLIO_TABLE: &str = "landing_portfolio_items";
pub const CASE_STUDIES_TABLE: &str = "landing_case_studies";
pub const CONTACTS_TABLE: &str = "landing_contact_submissions";

/// Record-store contract consumed by the admin session and the content
/// loader. Every method is one remote call; ordering and published filters
/// are part of the contract, not the caller's job.
#[async_trait]
pub trait LandingStore: Send + Sync {
    /// All testimonials, ascending by `display_order`.
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, StoreError>;
    async fn insert_testimonial(&self, record: &Testimonial) -> Result<(), StoreError>;
    async fn update_testimonial(&self, record: &Testimonial) -> Result<(), StoreError>;
    /// Partial update of a single row's `display_order`.
    async fn set_testimonial_order(
        &self,
        id: TestimonialId,
        display_order: u32,
    ) -> Result<(), StoreError>;
    async fn delete_testimonial(&self, id: TestimonialId) -> Result<(), StoreError>;
    async fn count_testimonials(&self) -> Result<u64, StoreError>;

    /// Portfolio items, descending by `created_at`. `published_only` is the
    /// landing-page view; the admin panel passes `false` and sees drafts.
    async fn list_portfolio_items(
        &self,
        published_only: bool,
    ) -> Result<Vec<PortfolioItem>, StoreError>;
    async fn insert_portfolio_item(&self, record: &PortfolioItem) -> Result<(), StoreError>;
    async fn update_portfolio_item(&self, record: &PortfolioItem) -> Result<(), StoreError>;
    async fn delete_portfolio_item(&self, id: PortfolioItemId) -> Result<(), StoreError>;
    async fn count_portfolio_items(&self) -> Result<u64, StoreError>;

    /// Case studies, descending by `created_at`.
    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>, StoreError>;
    async fn insert_case_study(&self, record: &CaseStudy) -> Result<(), StoreError>;
    async fn update_case_study(&self, record: &CaseStudy) -> Result<(), StoreError>;
    async fn delete_case_study(&self, id: CaseStudyId) -> Result<(), StoreError>;
    async fn count_case_studies(&self) -> Result<u64, StoreError>;

    /// Contact submissions, descending by `created_at`.
    async fn list_contact_submissions(&self) -> Result<Vec<ContactSubmission>, StoreError>;
    async fn insert_contact_submission(
        &self,
        record: &ContactSubmission,
    ) -> Result<(), StoreError>;
    async fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> Result<(), StoreError>;
    async fn delete_contact_submission(&self, id: ContactId) -> Result<(), StoreError>;
    async fn count_contact_submissions(&self) -> Result<u64, StoreError>;
}

/// File-blob side of the hosted backend: upload bytes under a path, resolve
/// the public URL for a stored path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;
    fn public_url(&self, path: &str) -> String;
}

#[derive(Serialize)]
struct OrderPatch {
    display_order: u32,
}

#[derive(Serialize)]
struct StatusPatch {
    status: ContactStatus,
}

/// PostgREST-style client for the hosted record store.
///
/// Row endpoints live under `/rest/v1/{table}`, blobs under
/// `/storage/v1/object/{bucket}`. Every request carries the project api key;
/// the bearer token defaults to the same key (anonymous role) unless an
/// authenticated session token is supplied.
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base_url: String,
    api_key: String,
    bearer_token: String,
    bucket: String,
}

impl RestStore {
    pub fn new(settings: &Settings) -> Self {
        let bearer_token = settings
            .store_service_token
            .clone()
            .unwrap_or_else(|| settings.store_api_key.clone());
        Self {
            http: Client::new(),
            base_url: settings.store_url.trim_end_matches('/').to_string(),
            api_key: settings.store_api_key.clone(),
            bearer_token,
            bucket: settings.images_bucket.clone(),
        }
    }

    fn rows_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{table}", self.base_url)
        } else {
            format!("{}/rest/v1/{table}?{query}", self.base_url)
        }
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer_token)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .authed(self.http.get(self.rows_url(table, query)))
            .send()
            .await
            .map_err(StoreError::fetch)?
            .error_for_status()
            .map_err(StoreError::fetch)?;
        response.json().await.map_err(StoreError::fetch)
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, record: &T) -> Result<(), StoreError> {
        self.authed(self.http.post(self.rows_url(table, "")))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(StoreError::write)?
            .error_for_status()
            .map_err(StoreError::write)?;
        Ok(())
    }

    async fn patch_by_id<T: Serialize + Sync>(
        &self,
        table: &str,
        id: impl std::fmt::Display,
        body: &T,
    ) -> Result<(), StoreError> {
        let query = format!("id=eq.{id}");
        self.authed(self.http.patch(self.rows_url(table, &query)))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await
            .map_err(StoreError::write)?
            .error_for_status()
            .map_err(StoreError::write)?;
        Ok(())
    }

    async fn delete_by_id(
        &self,
        table: &str,
        id: impl std::fmt::Display,
    ) -> Result<(), StoreError> {
        let query = format!("id=eq.{id}");
        self.authed(self.http.delete(self.rows_url(table, &query)))
            .send()
            .await
            .map_err(StoreError::write)?
            .error_for_status()
            .map_err(StoreError::write)?;
        Ok(())
    }

    /// PostgREST reports the exact row count in the `content-range` header of
    /// a HEAD request (`items 0-24/25`); the total follows the slash.
    async fn count(&self, table: &str) -> Result<u64, StoreError> {
        let response = self
            .authed(self.http.head(self.rows_url(table, "select=id")))
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(StoreError::fetch)?
            .error_for_status()
            .map_err(StoreError::fetch)?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| StoreError::fetch("missing content-range header on count"))?;
        parse_content_range_total(range)
            .ok_or_else(|| StoreError::fetch(format!("unparsable content-range '{range}'")))
    }
}

fn parse_content_range_total(range: &str) -> Option<u64> {
    range.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl LandingStore for RestStore {
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, StoreError> {
        self.select(TESTIMONIALS_TABLE, "select=*&order=display_order.asc")
            .await
    }

    async fn insert_testimonial(&self, record: &Testimonial) -> Result<(), StoreError> {
        self.insert(TESTIMONIALS_TABLE, record).await
    }

    async fn update_testimonial(&self, record: &Testimonial) -> Result<(), StoreError> {
        self.patch_by_id(TESTIMONIALS_TABLE, record.id, record).await
    }

    async fn set_testimonial_order(
        &self,
        id: TestimonialId,
        display_order: u32,
    ) -> Result<(), StoreError> {
        self.patch_by_id(TESTIMONIALS_TABLE, id, &OrderPatch { display_order })
            .await
    }

    async fn delete_testimonial(&self, id: TestimonialId) -> Result<(), StoreError> {
        self.delete_by_id(TESTIMONIALS_TABLE, id).await
    }

    async fn count_testimonials(&self) -> Result<u64, StoreError> {
        self.count(TESTIMONIALS_TABLE).await
    }

    async fn list_portfolio_items(
        &self,
        published_only: bool,
    ) -> Result<Vec<PortfolioItem>, StoreError> {
        let query = if published_only {
            "select=*&is_published=eq.true&order=created_at.desc"
        } else {
            "select=*&order=created_at.desc"
        };
        self.select(PORTFOLIO_TABLE, query).await
    }

    async fn insert_portfolio_item(&self, record: &PortfolioItem) -> Result<(), StoreError> {
        self.insert(PORTFOLIO_TABLE, record).await
    }

    async fn update_portfolio_item(&self, record: &PortfolioItem) -> Result<(), StoreError> {
        self.patch_by_id(PORTFOLIO_TABLE, record.id, record).await
    }

    async fn delete_portfolio_item(&self, id: PortfolioItemId) -> Result<(), StoreError> {
        self.delete_by_id(PORTFOLIO_TABLE, id).await
    }

    async fn count_portfolio_items(&self) -> Result<u64, StoreError> {
        self.count(PORTFOLIO_TABLE).await
    }

    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>, StoreError> {
        self.select(CASE_STUDIES_TABLE, "select=*&order=created_at.desc")
            .await
    }

    async fn insert_case_study(&self, record: &CaseStudy) -> Result<(), StoreError> {
        self.insert(CASE_STUDIES_TABLE, record).await
    }

    async fn update_case_study(&self, record: &CaseStudy) -> Result<(), StoreError> {
        self.patch_by_id(CASE_STUDIES_TABLE, record.id, record).await
    }

    async fn delete_case_study(&self, id: CaseStudyId) -> Result<(), StoreError> {
        self.delete_by_id(CASE_STUDIES_TABLE, id).await
    }

    async fn count_case_studies(&self) -> Result<u64, StoreError> {
        self.count(CASE_STUDIES_TABLE).await
    }

    async fn list_contact_submissions(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        self.select(CONTACTS_TABLE, "select=*&order=created_at.desc")
            .await
    }

    async fn insert_contact_submission(
        &self,
        record: &ContactSubmission,
    ) -> Result<(), StoreError> {
        self.insert(CONTACTS_TABLE, record).await
    }

    async fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> Result<(), StoreError> {
        self.patch_by_id(CONTACTS_TABLE, id, &StatusPatch { status })
            .await
    }

    async fn delete_contact_submission(&self, id: ContactId) -> Result<(), StoreError> {
        self.delete_by_id(CONTACTS_TABLE, id).await
    }

    async fn count_contact_submissions(&self) -> Result<u64, StoreError> {
        self.count(CONTACTS_TABLE).await
    }
}

#[async_trait]
impl BlobStore for RestStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let url = format!(
            "{}/storage/v1/object/{}/{path}",
            self.base_url, self.bucket
        );
        self.authed(self.http.post(url))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(StoreError::write)?
            .error_for_status()
            .map_err(StoreError::write)?;
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
