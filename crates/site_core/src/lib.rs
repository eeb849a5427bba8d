use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use shared::{
    domain::{Category, PortfolioItem},
    error::StoreError,
};
use store::LandingStore;
use tracing::{error, info, warn};

/// Where a page load is running. Production builds prefer the prebuilt
/// snapshot; everything else always queries live so development sees fresh
/// data.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub production_build: bool,
    pub snapshot_path: PathBuf,
}

impl LoadContext {
    pub fn production(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            production_build: true,
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn development(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            production_build: false,
            snapshot_path: snapshot_path.into(),
        }
    }
}

/// Parse the prebuilt snapshot artifact. The generator already filtered to
/// published rows, so the contents are served verbatim.
pub fn read_snapshot(path: &Path) -> Result<Vec<PortfolioItem>, StoreError> {
    let raw = fs::read_to_string(path).map_err(StoreError::snapshot)?;
    serde_json::from_str(&raw).map_err(StoreError::snapshot)
}

/// Live query: published items, newest first. Failures are logged and
/// degrade to an empty list; the portfolio section renders an empty state
/// rather than breaking the page.
pub async fn fetch_portfolio_items(store: &dyn LandingStore) -> Vec<PortfolioItem> {
    match store.list_portfolio_items(true).await {
        Ok(rows) => rows,
        Err(err) => {
            error!(error = %err, "portfolio live query failed");
            Vec::new()
        }
    }
}

/// Resolve the portfolio collection: snapshot first in production, live
/// query otherwise or whenever the snapshot is missing or unparsable. One
/// pass per page load, no retries.
pub async fn get_portfolio_items(
    ctx: &LoadContext,
    store: &dyn LandingStore,
) -> Vec<PortfolioItem> {
    if ctx.production_build {
        match read_snapshot(&ctx.snapshot_path) {
            Ok(items) => {
                info!(count = items.len(), "serving prebuilt portfolio snapshot");
                return items;
            }
            Err(err) => {
                warn!(error = %err, "snapshot unavailable; falling back to live query");
            }
        }
    }
    fetch_portfolio_items(store).await
}

/// Project the filter categories out of the loaded items: the synthetic
/// "all" entry first, then every distinct tag in first-seen order. Tag
/// identity is case-insensitive; the label keeps the first-seen casing.
pub fn derive_categories(items: &[PortfolioItem]) -> Vec<Category> {
    let mut categories = vec![Category::all_projects()];
    let mut seen = HashSet::new();
    for item in items {
        for tag in &item.tags {
            let id = tag.to_lowercase();
            if seen.insert(id.clone()) {
                categories.push(Category::new(id, tag.clone()));
            }
        }
    }
    categories
}

/// Client-side filter behind the category pills. "all" passes everything;
/// any other id matches items carrying that tag, case-insensitively.
pub fn filter_by_category<'a>(
    items: &'a [PortfolioItem],
    category_id: &str,
) -> Vec<&'a PortfolioItem> {
    if category_id == "all" {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.tags.iter().any(|tag| tag.to_lowercase() == category_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use shared::domain::PortfolioItemId;
    use store::MemoryStore;

    use super::*;

    fn item(title: &str, tags: &[&str], published: bool, age_days: i64) -> PortfolioItem {
        PortfolioItem {
            id: PortfolioItemId::generate(),
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            description: None,
            cover_image_url: None,
            live_url: None,
            repo_url: None,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            is_published: published,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn write_snapshot(items: &[PortfolioItem]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), serde_json::to_string_pretty(items).expect("json"))
            .expect("write snapshot");
        file
    }

    #[tokio::test]
    async fn development_ignores_a_present_snapshot() {
        let snapshot = write_snapshot(&[item("cached", &[], true, 1)]);
        let store = MemoryStore::new();
        store
            .seed_portfolio_items(vec![item("live", &[], true, 1)])
            .await;

        let ctx = LoadContext::development(snapshot.path());
        let items = get_portfolio_items(&ctx, &store).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "live");
    }

    #[tokio::test]
    async fn production_serves_the_snapshot_verbatim_without_refiltering() {
        // The generator owns the published filter; a draft that slipped into
        // the artifact comes back as-is.
        let snapshot = write_snapshot(&[
            item("published", &[], true, 2),
            item("draft in artifact", &[], false, 1),
        ]);
        let store = MemoryStore::new();
        store
            .seed_portfolio_items(vec![item("live", &[], true, 1)])
            .await;

        let ctx = LoadContext::production(snapshot.path());
        let items = get_portfolio_items(&ctx, &store).await;

        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["published", "draft in artifact"]);
    }

    #[tokio::test]
    async fn production_falls_back_to_live_when_the_snapshot_is_missing() {
        let store = MemoryStore::new();
        store
            .seed_portfolio_items(vec![item("live", &[], true, 1)])
            .await;

        let ctx = LoadContext::production("/nonexistent/portfolio-cache.json");
        let items = get_portfolio_items(&ctx, &store).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "live");
    }

    #[tokio::test]
    async fn production_falls_back_to_live_when_the_snapshot_is_corrupt() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), "{not json").expect("write");
        let store = MemoryStore::new();
        store
            .seed_portfolio_items(vec![item("live", &[], true, 1)])
            .await;

        let ctx = LoadContext::production(file.path());
        let items = get_portfolio_items(&ctx, &store).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "live");
    }

    #[tokio::test]
    async fn live_query_failure_degrades_to_an_empty_list() {
        let store = MemoryStore::new();
        store
            .seed_portfolio_items(vec![item("unreachable", &[], true, 1)])
            .await;
        store.fail_reads(true);

        let ctx = LoadContext::development("unused.json");
        assert!(get_portfolio_items(&ctx, &store).await.is_empty());
    }

    #[tokio::test]
    async fn live_query_surfaces_only_published_items_newest_first() {
        let store = MemoryStore::new();
        store
            .seed_portfolio_items(vec![
                item("older", &[], true, 5),
                item("draft", &[], false, 1),
                item("newer", &[], true, 2),
            ])
            .await;

        let items = fetch_portfolio_items(&store).await;
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[test]
    fn categories_dedupe_case_insensitively_keeping_first_seen_labels() {
        let items = vec![
            item("one", &["CAD"], true, 3),
            item("two", &["cad", "3D Printing"], true, 2),
            item("three", &["3d printing"], true, 1),
        ];

        let categories = derive_categories(&items);

        assert_eq!(
            categories,
            vec![
                Category::all_projects(),
                Category::new("cad", "CAD"),
                Category::new("3d printing", "3D Printing"),
            ]
        );
    }

    #[test]
    fn category_filter_matches_tags_case_insensitively() {
        let items = vec![
            item("one", &["CAD"], true, 2),
            item("two", &["Welding"], true, 1),
        ];

        let all = filter_by_category(&items, "all");
        assert_eq!(all.len(), 2);

        let cad = filter_by_category(&items, "cad");
        assert_eq!(cad.len(), 1);
        assert_eq!(cad[0].title, "one");
    }
}
