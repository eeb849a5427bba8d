use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use shared::{
    domain::{
        CaseStudy, CaseStudyId, ContactId, ContactStatus, ContactSubmission, PortfolioItem,
        PortfolioItemId, Testimonial, TestimonialId,
    },
    error::StoreError,
};
use tokio::sync::RwLock;

use crate::{BlobStore, LandingStore};

#[derive(Default)]
struct Collections {
    testimonials: Vec<Testimonial>,
    portfolio_items: Vec<PortfolioItem>,
    case_studies: Vec<CaseStudy>,
    contact_submissions: Vec<ContactSubmission>,
    blobs: HashMap<String, Vec<u8>>,
}

/// In-process implementation of the store traits. Used by tests and local
/// demos in place of the hosted backend.
///
/// Write semantics mirror the remote store: updates and deletes targeting an
/// absent id are silent no-ops (a zero-row PATCH), not errors. The failure
/// toggles make a whole class of calls return errors, for exercising the
/// degrade paths.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(StoreError::fetch("memory store reads disabled"))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::write("memory store writes disabled"))
        } else {
            Ok(())
        }
    }

    /// Raw testimonial rows in insertion order, bypassing the failure
    /// toggles. Lets tests inspect what actually persisted.
    pub async fn testimonial_rows(&self) -> Vec<Testimonial> {
        self.inner.read().await.testimonials.clone()
    }

    pub async fn seed_testimonials(&self, records: Vec<Testimonial>) {
        self.inner.write().await.testimonials = records;
    }

    pub async fn seed_portfolio_items(&self, records: Vec<PortfolioItem>) {
        self.inner.write().await.portfolio_items = records;
    }

    pub async fn seed_case_studies(&self, records: Vec<CaseStudy>) {
        self.inner.write().await.case_studies = records;
    }

    pub async fn seed_contact_submissions(&self, records: Vec<ContactSubmission>) {
        self.inner.write().await.contact_submissions = records;
    }
}

#[async_trait]
impl LandingStore for MemoryStore {
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, StoreError> {
        self.check_read()?;
        let mut rows = self.inner.read().await.testimonials.clone();
        rows.sort_by_key(|row| row.display_order);
        Ok(rows)
    }

    async fn insert_testimonial(&self, record: &Testimonial) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.write().await.testimonials.push(record.clone());
        Ok(())
    }

    async fn update_testimonial(&self, record: &Testimonial) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.write().await;
        if let Some(row) = inner.testimonials.iter_mut().find(|row| row.id == record.id) {
            *row = record.clone();
        }
        Ok(())
    }

    async fn set_testimonial_order(
        &self,
        id: TestimonialId,
        display_order: u32,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.write().await;
        if let Some(row) = inner.testimonials.iter_mut().find(|row| row.id == id) {
            row.display_order = display_order;
        }
        Ok(())
    }

    async fn delete_testimonial(&self, id: TestimonialId) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.write().await.testimonials.retain(|row| row.id != id);
        Ok(())
    }

    async fn count_testimonials(&self) -> Result<u64, StoreError> {
        self.check_read()?;
        Ok(self.inner.read().await.testimonials.len() as u64)
    }

    async fn list_portfolio_items(
        &self,
        published_only: bool,
    ) -> Result<Vec<PortfolioItem>, StoreError> {
        self.check_read()?;
        let mut rows = self.inner.read().await.portfolio_items.clone();
        if published_only {
            rows.retain(|row| row.is_published);
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_portfolio_item(&self, record: &PortfolioItem) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.write().await.portfolio_items.push(record.clone());
        Ok(())
    }

    async fn update_portfolio_item(&self, record: &PortfolioItem) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.write().await;
        if let Some(row) = inner
            .portfolio_items
            .iter_mut()
            .find(|row| row.id == record.id)
        {
            *row = record.clone();
        }
        Ok(())
    }

    async fn delete_portfolio_item(&self, id: PortfolioItemId) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner
            .write()
            .await
            .portfolio_items
            .retain(|row| row.id != id);
        Ok(())
    }

    async fn count_portfolio_items(&self) -> Result<u64, StoreError> {
        self.check_read()?;
        Ok(self.inner.read().await.portfolio_items.len() as u64)
    }

    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>, StoreError> {
        self.check_read()?;
        let mut rows = self.inner.read().await.case_studies.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_case_study(&self, record: &CaseStudy) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.write().await.case_studies.push(record.clone());
        Ok(())
    }

    async fn update_case_study(&self, record: &CaseStudy) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.write().await;
        if let Some(row) = inner.case_studies.iter_mut().find(|row| row.id == record.id) {
            *row = record.clone();
        }
        Ok(())
    }

    async fn delete_case_study(&self, id: CaseStudyId) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.write().await.case_studies.retain(|row| row.id != id);
        Ok(())
    }

    async fn count_case_studies(&self) -> Result<u64, StoreError> {
        self.check_read()?;
        Ok(self.inner.read().await.case_studies.len() as u64)
    }

    async fn list_contact_submissions(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        self.check_read()?;
        let mut rows = self.inner.read().await.contact_submissions.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_contact_submission(
        &self,
        record: &ContactSubmission,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner
            .write()
            .await
            .contact_submissions
            .push(record.clone());
        Ok(())
    }

    async fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.write().await;
        if let Some(row) = inner
            .contact_submissions
            .iter_mut()
            .find(|row| row.id == id)
        {
            row.status = status;
        }
        Ok(())
    }

    async fn delete_contact_submission(&self, id: ContactId) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner
            .write()
            .await
            .contact_submissions
            .retain(|row| row.id != id);
        Ok(())
    }

    async fn count_contact_submissions(&self) -> Result<u64, StoreError> {
        self.check_read()?;
        Ok(self.inner.read().await.contact_submissions.len() as u64)
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        self.check_write()?;
        self.inner
            .write()
            .await
            .blobs
            .insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://images/{path}")
    }
}
