use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use chapter_core::{normalize, order_for_processing};

use crate::archive::{load_completed_titles, ArchiveError, ChapterArchive};
use crate::fetch::{FetchError, PageFetcher};
use crate::site::SiteAdapter;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub archive_path: PathBuf,
    /// Skip chapters whose titles the archive already holds.
    pub resume: bool,
    /// Reflow chapter bodies through the normalizer before writing.
    pub normalize: bool,
    /// Uniform inter-request sleep in seconds. This is the polite-crawl
    /// throttle, separate from the fetcher's retry backoff.
    pub delay_secs: RangeInclusive<f64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("novel.txt"),
            resume: true,
            normalize: true,
            delay_secs: 3.0..=6.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("could not retrieve catalog: {0}")]
    CatalogUnavailable(#[source] FetchError),
    #[error("catalog yielded no chapters")]
    EmptyCatalog,
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("run cancelled")]
    Cancelled,
}

/// Drives one full run: catalog fetch, ordering, resume filter, then the
/// strictly sequential chapter loop.
///
/// Individual chapter failures are recorded as placeholders and the run
/// moves on; only catalog-level failures are fatal. The archive is not
/// opened until the catalog has produced work to do.
pub async fn run(
    settings: &RunSettings,
    site: &dyn SiteAdapter,
    fetcher: &dyn PageFetcher,
    cancel: &CancellationToken,
) -> Result<RunSummary, RunError> {
    log::info!("resolving catalog for {} at {}", site.name(), site.catalog_url());
    let catalog_page = match fetcher.fetch_page(site.catalog_url(), cancel).await {
        Ok(page) => page,
        Err(FetchError::Cancelled) => return Err(RunError::Cancelled),
        Err(err) => return Err(RunError::CatalogUnavailable(err)),
    };

    let chapters = site.parse_catalog(&catalog_page.html, site.catalog_url());
    if chapters.is_empty() {
        return Err(RunError::EmptyCatalog);
    }

    let reverse = site.reverse_order();
    if reverse {
        log::info!("catalog lists newest first; reversing to reading order");
    }
    let chapters = order_for_processing(chapters, reverse);

    let completed = if settings.resume {
        let titles = load_completed_titles(&settings.archive_path);
        if !titles.is_empty() {
            log::info!("{} chapters already archived; they will be skipped", titles.len());
        }
        titles
    } else {
        BTreeSet::new()
    };

    let mut archive = ChapterArchive::open(&settings.archive_path)?;
    let mut summary = RunSummary {
        total: chapters.len(),
        ..RunSummary::default()
    };
    log::info!("{} chapters in catalog", summary.total);

    for (index, chapter) in chapters.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        if settings.resume && completed.contains(&chapter.title) {
            log::info!(
                "[{}/{}] skipping {} (already archived)",
                index + 1,
                summary.total,
                chapter.title
            );
            summary.skipped += 1;
            continue;
        }

        log::info!("[{}/{}] fetching {}", index + 1, summary.total, chapter.title);
        match fetcher.fetch_page(&chapter.locator, cancel).await {
            Ok(page) => match site.parse_content(&page.html) {
                Some(raw) if !raw.trim().is_empty() => {
                    let body = if settings.normalize { normalize(&raw) } else { raw };
                    archive.append_chapter(&chapter.title, &body)?;
                    summary.downloaded += 1;
                }
                _ => {
                    log::warn!(
                        "no content extracted from {}; recording failure for {}",
                        chapter.locator,
                        chapter.title
                    );
                    archive.append_failure(&chapter.title)?;
                    summary.failed += 1;
                }
            },
            Err(FetchError::Cancelled) => return Err(RunError::Cancelled),
            Err(err) => {
                log::warn!("recording failure for {}: {err}", chapter.title);
                archive.append_failure(&chapter.title)?;
                summary.failed += 1;
            }
        }

        throttle(&settings.delay_secs, cancel).await?;
    }

    log::info!(
        "run complete: {} downloaded, {} skipped, {} failed",
        summary.downloaded,
        summary.skipped,
        summary.failed
    );
    Ok(summary)
}

async fn throttle(
    delay_secs: &RangeInclusive<f64>,
    cancel: &CancellationToken,
) -> Result<(), RunError> {
    let secs = if delay_secs.start() >= delay_secs.end() {
        *delay_secs.start()
    } else {
        rand::rng().random_range(delay_secs.clone())
    };
    if secs > 0.0 {
        log::debug!("throttling for {secs:.1}s");
    }
    match cancel
        .run_until_cancelled(tokio::time::sleep(Duration::from_secs_f64(secs)))
        .await
    {
        Some(()) => Ok(()),
        None => Err(RunError::Cancelled),
    }
}
