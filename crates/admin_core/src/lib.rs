use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{
        CaseStudy, CaseStudyId, ContactId, ContactStatus, ContactSubmission, PortfolioItem,
        PortfolioItemId, Testimonial, TestimonialId,
    },
    error::StoreError,
};
use store::{BlobStore, LandingStore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

pub mod ordering;

pub use ordering::{OrderUpdate, OrderedCollection, OrderedRecord, OrderingError};

impl OrderedRecord for Testimonial {
    type Id = TestimonialId;

    fn id(&self) -> TestimonialId {
        self.id
    }

    fn display_order(&self) -> u32 {
        self.display_order
    }

    fn set_display_order(&mut self, display_order: u32) {
        self.display_order = display_order;
    }
}

/// One dispatched `display_order` write. Dropping the handle detaches the
/// write (fire-and-forget); awaiting it yields the store's verdict. Either
/// way the optimistic in-memory order stands.
#[derive(Debug)]
pub struct OrderWrite {
    pub update: OrderUpdate<TestimonialId>,
    pub task: JoinHandle<Result<(), StoreError>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTestimonial {
    pub client_name: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub content: String,
    pub rating: u8,
    pub image_url: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewPortfolioItem {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    /// Comma-separated, as typed into the tags field.
    pub tags: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewCaseStudy {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub client_name: Option<String>,
    pub industry: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardCounts {
    pub contact_submissions: u64,
    pub testimonials: u64,
    pub portfolio_items: u64,
    pub case_studies: u64,
}

/// Split a comma-separated tag field into trimmed, non-empty tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// The admin panel's working state: one in-memory copy of each collection,
/// mutated optimistically and reconciled against the remote store.
///
/// Reorder and delete writes are dispatched without blocking; their failures
/// are logged and the optimistic state is kept (drift until the next load is
/// accepted). Creates and edits go through a form, so those writes are
/// awaited and surface their errors.
pub struct AdminSession<S: LandingStore + BlobStore + 'static> {
    store: Arc<S>,
    http: reqwest::Client,
    testimonials: OrderedCollection<Testimonial>,
    portfolio_items: Vec<PortfolioItem>,
    case_studies: Vec<CaseStudy>,
    contacts: Vec<ContactSubmission>,
}

impl<S: LandingStore + BlobStore + 'static> AdminSession<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
            testimonials: OrderedCollection::new(),
            portfolio_items: Vec::new(),
            case_studies: Vec::new(),
            contacts: Vec::new(),
        }
    }

    pub fn testimonials(&self) -> &[Testimonial] {
        self.testimonials.items()
    }

    pub fn portfolio_items(&self) -> &[PortfolioItem] {
        &self.portfolio_items
    }

    pub fn case_studies(&self) -> &[CaseStudy] {
        &self.case_studies
    }

    pub fn contacts(&self) -> &[ContactSubmission] {
        &self.contacts
    }

    // ---- testimonials ----

    /// Fetch all testimonials in display order. A failed fetch logs and
    /// leaves an empty list; there is no retry.
    pub async fn load_testimonials(&mut self) -> &[Testimonial] {
        match self.store.list_testimonials().await {
            Ok(rows) => self.testimonials.reset(rows),
            Err(err) => {
                error!(error = %err, "failed to load testimonials");
                self.testimonials.reset(Vec::new());
            }
        }
        self.testimonials.items()
    }

    /// Apply a drag gesture: reorder in memory synchronously, then dispatch
    /// one independent write per changed row. Writes race each other and
    /// never roll the UI back.
    pub fn move_testimonial(
        &mut self,
        active_id: TestimonialId,
        over_id: TestimonialId,
    ) -> Result<Vec<OrderWrite>, OrderingError> {
        let updates = self.testimonials.move_item(active_id, over_id)?;
        Ok(self.dispatch_order_writes(updates))
    }

    fn dispatch_order_writes(&self, updates: Vec<OrderUpdate<TestimonialId>>) -> Vec<OrderWrite> {
        updates
            .into_iter()
            .map(|update| {
                let store = Arc::clone(&self.store);
                let task = tokio::spawn(async move {
                    let result = store
                        .set_testimonial_order(update.id, update.display_order)
                        .await;
                    if let Err(err) = &result {
                        warn!(
                            id = %update.id,
                            display_order = update.display_order,
                            error = %err,
                            "display_order write failed; keeping optimistic order"
                        );
                    }
                    result
                });
                OrderWrite { update, task }
            })
            .collect()
    }

    /// Remove locally right away and let the remote delete run behind it.
    /// Survivors keep their stored order values.
    pub fn delete_testimonial(&mut self, id: TestimonialId) -> JoinHandle<Result<(), StoreError>> {
        self.testimonials.remove(id);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = store.delete_testimonial(id).await;
            if let Err(err) = &result {
                warn!(id = %id, error = %err, "testimonial delete failed remotely");
            }
            result
        })
    }

    /// New testimonials append at the end: `display_order` = current row
    /// count (falling back to the local count if the remote count fails).
    pub async fn create_testimonial(
        &mut self,
        draft: NewTestimonial,
    ) -> Result<TestimonialId, StoreError> {
        let display_order = match self.store.count_testimonials().await {
            Ok(count) => count as u32,
            Err(err) => {
                warn!(error = %err, "count failed; appending after local rows");
                self.testimonials.len() as u32
            }
        };
        let record = Testimonial {
            id: TestimonialId::generate(),
            client_name: draft.client_name,
            company: draft.company,
            role: draft.role,
            content: draft.content,
            rating: draft.rating,
            image_url: draft.image_url,
            is_published: draft.is_published,
            display_order,
        };
        self.store.insert_testimonial(&record).await?;
        let id = record.id;
        self.testimonials.push(record);
        Ok(id)
    }

    pub async fn update_testimonial(&mut self, record: Testimonial) -> Result<(), StoreError> {
        self.store.update_testimonial(&record).await?;
        let rows = self.store.list_testimonials().await.unwrap_or_else(|err| {
            error!(error = %err, "reload after edit failed");
            Vec::new()
        });
        self.testimonials.reset(rows);
        Ok(())
    }

    // ---- portfolio ----

    /// Admin view: drafts included, newest first.
    pub async fn load_portfolio(&mut self) -> &[PortfolioItem] {
        self.portfolio_items = match self.store.list_portfolio_items(false).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "failed to load portfolio items");
                Vec::new()
            }
        };
        &self.portfolio_items
    }

    pub async fn create_portfolio_item(
        &mut self,
        draft: NewPortfolioItem,
    ) -> Result<PortfolioItemId, StoreError> {
        let record = PortfolioItem {
            id: PortfolioItemId::generate(),
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            cover_image_url: draft.cover_image_url,
            live_url: draft.live_url,
            repo_url: draft.repo_url,
            tags: parse_tags(&draft.tags),
            is_published: draft.is_published,
            created_at: Utc::now(),
        };
        self.store.insert_portfolio_item(&record).await?;
        let id = record.id;
        self.portfolio_items.insert(0, record);
        Ok(id)
    }

    pub async fn update_portfolio_item(&mut self, record: PortfolioItem) -> Result<(), StoreError> {
        self.store.update_portfolio_item(&record).await?;
        if let Some(row) = self
            .portfolio_items
            .iter_mut()
            .find(|row| row.id == record.id)
        {
            *row = record;
        }
        Ok(())
    }

    pub fn delete_portfolio_item(
        &mut self,
        id: PortfolioItemId,
    ) -> JoinHandle<Result<(), StoreError>> {
        self.portfolio_items.retain(|row| row.id != id);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = store.delete_portfolio_item(id).await;
            if let Err(err) = &result {
                warn!(id = %id, error = %err, "portfolio delete failed remotely");
            }
            result
        })
    }

    // ---- case studies ----

    pub async fn load_case_studies(&mut self) -> &[CaseStudy] {
        self.case_studies = match self.store.list_case_studies().await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "failed to load case studies");
                Vec::new()
            }
        };
        &self.case_studies
    }

    pub async fn create_case_study(
        &mut self,
        draft: NewCaseStudy,
    ) -> Result<CaseStudyId, StoreError> {
        let record = CaseStudy {
            id: CaseStudyId::generate(),
            title: draft.title,
            slug: draft.slug,
            summary: draft.summary,
            content: draft.content,
            client_name: draft.client_name,
            industry: draft.industry,
            is_published: draft.is_published,
            created_at: Utc::now(),
        };
        self.store.insert_case_study(&record).await?;
        let id = record.id;
        self.case_studies.insert(0, record);
        Ok(id)
    }

    pub async fn update_case_study(&mut self, record: CaseStudy) -> Result<(), StoreError> {
        self.store.update_case_study(&record).await?;
        if let Some(row) = self.case_studies.iter_mut().find(|row| row.id == record.id) {
            *row = record;
        }
        Ok(())
    }

    pub fn delete_case_study(&mut self, id: CaseStudyId) -> JoinHandle<Result<(), StoreError>> {
        self.case_studies.retain(|row| row.id != id);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = store.delete_case_study(id).await;
            if let Err(err) = &result {
                warn!(id = %id, error = %err, "case study delete failed remotely");
            }
            result
        })
    }

    // ---- contacts ----

    pub async fn load_contacts(&mut self) -> &[ContactSubmission] {
        self.contacts = match self.store.list_contact_submissions().await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "failed to load contact submissions");
                Vec::new()
            }
        };
        &self.contacts
    }

    /// Public-form intake: every submission starts out `new`.
    pub async fn submit_contact(&self, form: ContactForm) -> Result<ContactId, StoreError> {
        let record = ContactSubmission {
            id: ContactId::generate(),
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            message: form.message,
            status: ContactStatus::New,
            created_at: Utc::now(),
        };
        self.store.insert_contact_submission(&record).await?;
        Ok(record.id)
    }

    /// Optimistic status flip; the remote patch runs behind it.
    pub fn set_contact_status(
        &mut self,
        id: ContactId,
        status: ContactStatus,
    ) -> JoinHandle<Result<(), StoreError>> {
        if let Some(row) = self.contacts.iter_mut().find(|row| row.id == id) {
            row.status = status;
        }
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = store.set_contact_status(id, status).await;
            if let Err(err) = &result {
                warn!(id = %id, error = %err, "contact status write failed remotely");
            }
            result
        })
    }

    pub fn delete_contact(&mut self, id: ContactId) -> JoinHandle<Result<(), StoreError>> {
        self.contacts.retain(|row| row.id != id);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = store.delete_contact_submission(id).await;
            if let Err(err) = &result {
                warn!(id = %id, error = %err, "contact delete failed remotely");
            }
            result
        })
    }

    // ---- blobs, hooks, dashboard ----

    /// Store image bytes under a collection-scoped random name and hand back
    /// the public URL for the record's `image_url` field.
    pub async fn upload_image(
        &self,
        collection: &str,
        file_ext: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let path = format!("{collection}/{}.{file_ext}", Uuid::new_v4());
        let stored = self.store.upload(&path, bytes, content_type).await?;
        Ok(self.store.public_url(&stored))
    }

    /// Kick the hosting provider's deploy hook. The response body carries no
    /// useful signal; reachability is the success criterion.
    pub async fn trigger_deploy(&self, hook_url: &str) -> Result<(), StoreError> {
        self.http
            .post(hook_url)
            .send()
            .await
            .map_err(StoreError::write)?
            .error_for_status()
            .map_err(StoreError::write)?;
        info!("deploy hook triggered");
        Ok(())
    }

    pub async fn dashboard_counts(&self) -> Result<DashboardCounts, StoreError> {
        let (contact_submissions, testimonials, portfolio_items, case_studies) = futures::try_join!(
            self.store.count_contact_submissions(),
            self.store.count_testimonials(),
            self.store.count_portfolio_items(),
            self.store.count_case_studies(),
        )?;
        Ok(DashboardCounts {
            contact_submissions,
            testimonials,
            portfolio_items,
            case_studies,
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
