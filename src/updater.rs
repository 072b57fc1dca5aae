// Run orchestration.
// Refreshes due categories, falls back to cached values, patches the document.

use chrono::{DateTime, Utc};

use crate::badge::{domination_card_url, personal_card_url, progress_badge_url};
use crate::cache::{self, CacheRecord, Category, RefreshPolicy};
use crate::config::AppConfig;
use crate::document::{
    DOMINATION_BLOCK, Document, PERSONAL_BLOCK, PROGRESS_BLOCK, image_markdown,
};
use crate::error::Result;
use crate::images::{BadgeImage, mirror_all};
use crate::luogu::endpoints::{fetch_practice, fetch_tier_totals};
use crate::luogu::{PageFetcher, TierCounts};
use crate::progress::weighted_percentage;

/// What happened to a category during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cached value was fresh enough.
    Skipped,
    /// New value stored and timestamp advanced.
    Refreshed,
    /// Some parts refreshed; timestamp left alone so the rest is retried.
    Partial,
    /// Nothing usable fetched; cached value kept.
    Failed,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub personal: RefreshOutcome,
    pub totals: RefreshOutcome,
    pub passed: TierCounts,
    pub unpassed: u32,
    pub total_counts: TierCounts,
    pub percentage: f64,
    pub images_saved: usize,
}

/// Drives one refresh-and-patch run.
pub struct Updater<'a, F: PageFetcher + ?Sized> {
    config: &'a AppConfig,
    fetcher: &'a F,
    personal: RefreshPolicy,
    totals: RefreshPolicy,
    download_images: bool,
}

impl<'a, F: PageFetcher + ?Sized> Updater<'a, F> {
    pub fn new(config: &'a AppConfig, fetcher: &'a F) -> Self {
        Self {
            config,
            fetcher,
            personal: RefreshPolicy::new(config.personal_refresh()),
            totals: RefreshPolicy::new(config.totals_refresh()),
            download_images: config.download_images,
        }
    }

    /// Refetch every category regardless of cache age.
    pub fn force(mut self, force: bool) -> Self {
        self.personal = self.personal.forced(force);
        self.totals = self.totals.forced(force);
        self
    }

    pub fn download_images(mut self, enabled: bool) -> Self {
        self.download_images = enabled;
        self
    }

    /// Refresh the personal statistics if they are due.
    pub async fn refresh_personal(&self, cache: &mut CacheRecord, now: f64) -> RefreshOutcome {
        let category = Category::Personal;
        if !self.personal.is_due(cache.last_update_time, now) {
            tracing::info!(%category, "cache still fresh, skipping fetch");
            return RefreshOutcome::Skipped;
        }

        tracing::info!(%category, "fetching practice page");
        match fetch_practice(self.fetcher, self.config).await {
            Ok(snapshot) => {
                tracing::info!(
                    %category,
                    passed = ?snapshot.passed,
                    unpassed = snapshot.unpassed,
                    "refreshed"
                );
                cache.personal_passed = snapshot.passed.to_vec();
                cache.personal_unpassed = snapshot.unpassed;
                cache.last_update_time = now;
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                tracing::warn!(%category, error = %e, "refresh failed, using cached values");
                RefreshOutcome::Failed
            }
        }
    }

    /// Refresh the per-tier problem totals if they are due.
    pub async fn refresh_totals(&self, cache: &mut CacheRecord, now: f64) -> RefreshOutcome {
        let category = Category::Totals;
        if !self.totals.is_due(cache.total_last_time, now) {
            tracing::info!(%category, "cache still fresh, skipping fetch");
            return RefreshOutcome::Skipped;
        }

        let fetched = fetch_tier_totals(self.fetcher, self.config, &cache.totals()).await;
        if fetched.is_empty() {
            tracing::warn!(%category, "no tier totals fetched, using cached values");
            return RefreshOutcome::Failed;
        }

        cache.total_counts = fetched.counts.to_vec();
        if fetched.is_complete() {
            cache.total_last_time = now;
            tracing::info!(%category, totals = ?fetched.counts, "refreshed");
            RefreshOutcome::Refreshed
        } else {
            tracing::warn!(
                %category,
                failed = ?fetched.failed,
                "some tiers failed, will retry next run"
            );
            RefreshOutcome::Partial
        }
    }

    /// Badge images for the current cached counts.
    pub fn badge_images(&self, cache: &CacheRecord, percentage: f64) -> Vec<BadgeImage> {
        let config = self.config;
        vec![
            BadgeImage {
                block: PERSONAL_BLOCK,
                file_name: "personal-stats.svg",
                alt: "Practice statistics",
                url: personal_card_url(
                    &config.card_api_base,
                    &config.personal,
                    &cache.passed(),
                    cache.personal_unpassed,
                ),
            },
            BadgeImage {
                block: DOMINATION_BLOCK,
                file_name: "domination-progress.svg",
                alt: "Domination progress",
                url: domination_card_url(
                    &config.card_api_base,
                    &config.domination,
                    &cache.totals(),
                ),
            },
            BadgeImage {
                block: PROGRESS_BLOCK,
                file_name: "weighted-progress.svg",
                alt: "Weighted domination progress",
                url: progress_badge_url(&config.progress_label, percentage),
            },
        ]
    }

    /// Execute a full run at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let config = self.config;
        let now_secs = cache::epoch_secs(&now);

        let mut record = cache::load(&config.cache_path);

        let personal = self.refresh_personal(&mut record, now_secs).await;
        let totals = self.refresh_totals(&mut record, now_secs).await;

        let passed = record.passed();
        let total_counts = record.totals();
        let percentage = weighted_percentage(&passed, &total_counts);
        tracing::info!("weighted progress: {percentage:.10}%");

        let images = self.badge_images(&record, percentage);
        for image in &images {
            tracing::debug!(block = image.block, url = %image.url, "badge url");
        }

        let images_saved = if self.download_images {
            mirror_all(self.fetcher, &config.image_dir, &images).await
        } else {
            0
        };

        let mut document = Document::load(&config.document_path, &config.document_title)?;
        for image in &images {
            let target = image.link_target(
                &config.image_dir,
                &config.document_path,
                self.download_images,
            );
            document.set_block(image.block, &image_markdown(image.alt, &target));
        }
        document.set_updated_at(&now);
        document.save()?;

        cache::write_record(&config.cache_path, &record)?;

        Ok(RunSummary {
            personal,
            totals,
            passed,
            unpassed: record.personal_unpassed,
            total_counts,
            percentage,
            images_saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luogu::TIER_COUNT;
    use crate::luogu::fake::{FakeFetcher, lentille_page};
    use std::fs;
    use tempfile::TempDir;

    const NOW: f64 = 1_700_000_000.0;

    fn test_config(dir: &TempDir) -> AppConfig {
        AppConfig {
            cache_path: dir.path().join("data").join("last_update.json"),
            document_path: dir.path().join("README.md"),
            image_dir: dir.path().join("img"),
            ..Default::default()
        }
    }

    fn practice_page() -> String {
        lentille_page(
            r#"{"data": {
                "passed": [
                    {"type": "P", "difficulty": 1},
                    {"type": "P", "difficulty": 3},
                    {"type": "B", "difficulty": 0}
                ],
                "submitted": [{"type": "P", "difficulty": 5}]
            }}"#,
        )
    }

    fn tier_page(count: u32) -> String {
        lentille_page(&format!(r#"{{"data": {{"problems": {{"count": {count}}}}}}}"#))
    }

    fn full_fetcher(config: &AppConfig) -> FakeFetcher {
        let mut fetcher = FakeFetcher::new().with_page(&config.practice_page_url(), practice_page());
        for tier in 0..TIER_COUNT {
            fetcher = fetcher.with_page(&config.problem_list_page_url(tier), tier_page(10));
        }
        fetcher
    }

    fn cached() -> CacheRecord {
        CacheRecord {
            last_update_time: NOW - 100.0,
            personal_passed: vec![9, 9, 9, 9, 9, 9, 9, 9],
            personal_unpassed: 4,
            total_counts: vec![20; TIER_COUNT],
            total_last_time: NOW - 100.0,
        }
    }

    #[tokio::test]
    async fn test_personal_not_due_keeps_cache() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = full_fetcher(&config);
        let updater = Updater::new(&config, &fetcher);

        let mut record = CacheRecord {
            last_update_time: NOW - (config.personal_refresh_secs as f64 - 1.0),
            ..cached()
        };
        let before = record.clone();

        let outcome = updater.refresh_personal(&mut record, NOW).await;

        assert_eq!(outcome, RefreshOutcome::Skipped);
        assert_eq!(record, before);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_personal_due_refreshes() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = full_fetcher(&config);
        let updater = Updater::new(&config, &fetcher);

        let mut record = CacheRecord {
            last_update_time: NOW - (config.personal_refresh_secs as f64 + 1.0),
            ..cached()
        };

        let outcome = updater.refresh_personal(&mut record, NOW).await;

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(fetcher.requests(), vec![config.practice_page_url()]);
        assert_eq!(record.passed(), [1, 1, 0, 1, 0, 0, 0, 0]);
        assert_eq!(record.personal_unpassed, 1);
        assert_eq!(record.last_update_time, NOW);
    }

    #[tokio::test]
    async fn test_personal_failure_keeps_cache_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = FakeFetcher::new()
            .with_page(&config.practice_page_url(), "<html>login required</html>".into());
        let updater = Updater::new(&config, &fetcher).force(true);

        let mut record = cached();
        let before = record.clone();

        let outcome = updater.refresh_personal(&mut record, NOW).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(record, before);
    }

    #[tokio::test]
    async fn test_totals_partial_failure_does_not_advance_timestamp() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = FakeFetcher::new()
            .with_page(&config.problem_list_page_url(0), tier_page(50))
            .with_page(&config.problem_list_page_url(7), tier_page(70));
        let updater = Updater::new(&config, &fetcher).force(true);

        let mut record = cached();
        let outcome = updater.refresh_totals(&mut record, NOW).await;

        assert_eq!(outcome, RefreshOutcome::Partial);
        assert_eq!(record.totals(), [50, 20, 20, 20, 20, 20, 20, 70]);
        assert_eq!(record.total_last_time, NOW - 100.0);
    }

    #[tokio::test]
    async fn test_totals_all_zero_is_failure() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut fetcher = FakeFetcher::new();
        for tier in 0..TIER_COUNT {
            fetcher = fetcher.with_page(&config.problem_list_page_url(tier), tier_page(0));
        }
        let updater = Updater::new(&config, &fetcher).force(true);

        let mut record = cached();
        let before = record.clone();
        let outcome = updater.refresh_totals(&mut record, NOW).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(record, before);
    }

    #[tokio::test]
    async fn test_run_writes_document_and_cache() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = full_fetcher(&config);
        let updater = Updater::new(&config, &fetcher).download_images(false);

        let summary = updater.run(Utc::now()).await.unwrap();

        assert_eq!(summary.personal, RefreshOutcome::Refreshed);
        assert_eq!(summary.totals, RefreshOutcome::Refreshed);
        assert_eq!(summary.passed, [1, 1, 0, 1, 0, 0, 0, 0]);
        assert_eq!(summary.total_counts, [10; TIER_COUNT]);
        // (0.1 * 10 + 0.1 * 1 + 0.1 * 9) / 150 * 100
        assert!((summary.percentage - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.images_saved, 0);

        let readme = fs::read_to_string(&config.document_path).unwrap();
        assert!(readme.starts_with(&format!("# {}\n\n", config.document_title)));
        let personal_url = personal_card_url(
            &config.card_api_base,
            &config.personal,
            &[1, 1, 0, 1, 0, 0, 0, 0],
            1,
        );
        assert!(readme.contains(&format!("![Practice statistics]({personal_url})")));
        assert!(readme.contains("<!-- DOMINATION_IMG_START -->"));
        assert!(readme.contains("<!-- PROGRESS_BADGE_START -->"));
        assert!(readme.contains("<!-- LAST_UPDATE: "));

        let record = cache::read_record(&config.cache_path).unwrap().unwrap();
        assert_eq!(record.personal_unpassed, 1);
        assert_eq!(record.totals(), [10; TIER_COUNT]);
        assert!(record.last_update_time > 0.0);
        assert_eq!(record.last_update_time, record.total_last_time);
    }

    #[tokio::test]
    async fn test_second_run_uses_cache_and_is_stable() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = full_fetcher(&config);
        let updater = Updater::new(&config, &fetcher).download_images(false);

        let at = Utc::now();
        updater.run(at).await.unwrap();
        let first = fs::read_to_string(&config.document_path).unwrap();
        let requests_after_first = fetcher.requests().len();

        let summary = updater.run(at).await.unwrap();
        let second = fs::read_to_string(&config.document_path).unwrap();

        assert_eq!(summary.personal, RefreshOutcome::Skipped);
        assert_eq!(summary.totals, RefreshOutcome::Skipped);
        assert_eq!(fetcher.requests().len(), requests_after_first);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_run_mirrors_images() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let expected = Updater::new(&config, &FakeFetcher::new()).badge_images(
            &CacheRecord {
                personal_passed: vec![1, 1, 0, 1, 0, 0, 0, 0],
                personal_unpassed: 1,
                total_counts: vec![10; TIER_COUNT],
                ..Default::default()
            },
            4.0 / 3.0,
        );

        let mut fetcher = full_fetcher(&config);
        // Progress badge URL depends on float formatting; leave it unserved.
        for image in expected.iter().filter(|i| i.block != PROGRESS_BLOCK) {
            fetcher = fetcher.with_binary(&image.url, b"<svg/>");
        }
        let updater = Updater::new(&config, &fetcher);

        let summary = updater.run(Utc::now()).await.unwrap();

        assert_eq!(summary.images_saved, 2);
        assert!(config.image_dir.join("personal-stats.svg").exists());
        assert!(config.image_dir.join("domination-progress.svg").exists());
        assert!(!config.image_dir.join("weighted-progress.svg").exists());

        let readme = fs::read_to_string(&config.document_path).unwrap();
        assert!(readme.contains("![Practice statistics](img/personal-stats.svg)"));
        assert!(readme.contains("![Weighted domination progress](img/weighted-progress.svg)"));
        assert!(!readme.contains(&dir.path().to_string_lossy().to_string()));
    }

    #[tokio::test]
    async fn test_personal_missing_passed_keeps_cache() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let fetcher = FakeFetcher::new().with_page(
            &config.practice_page_url(),
            lentille_page(r#"{"data": {"user": {"uid": 1}}}"#),
        );
        let updater = Updater::new(&config, &fetcher).force(true);

        let mut record = cached();
        let before = record.clone();

        let outcome = updater.refresh_personal(&mut record, NOW).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(record, before);
    }

    #[tokio::test]
    async fn test_run_personal_failure_does_not_block_totals() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        cache::write_record(&config.cache_path, &cached()).unwrap();

        let mut fetcher = FakeFetcher::new();
        for tier in 0..TIER_COUNT {
            fetcher = fetcher.with_page(&config.problem_list_page_url(tier), tier_page(40));
        }
        let updater = Updater::new(&config, &fetcher)
            .force(true)
            .download_images(false);

        let at = Utc::now();
        let summary = updater.run(at).await.unwrap();

        assert_eq!(summary.personal, RefreshOutcome::Failed);
        assert_eq!(summary.totals, RefreshOutcome::Refreshed);
        assert_eq!(summary.passed, [9; TIER_COUNT]);
        assert_eq!(summary.total_counts, [40; TIER_COUNT]);

        let record = cache::read_record(&config.cache_path).unwrap().unwrap();
        assert_eq!(record.last_update_time, NOW - 100.0);
        assert_eq!(record.personal_unpassed, 4);
        assert_eq!(record.totals(), [40; TIER_COUNT]);
        assert_eq!(record.total_last_time, cache::epoch_secs(&at));

        let readme = fs::read_to_string(&config.document_path).unwrap();
        let domination_url =
            domination_card_url(&config.card_api_base, &config.domination, &[40; TIER_COUNT]);
        assert!(readme.contains(&format!("![Domination progress]({domination_url})")));
        assert!(readme.contains("<!-- PERSONAL_IMG_START -->"));
        assert!(readme.contains("<!-- LAST_UPDATE: "));
    }
}
