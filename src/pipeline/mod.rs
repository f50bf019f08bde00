//! Sequential enrichment run over all descriptors.
//!
//! One descriptor at a time: resume check, resolve, download, record.
//! Per-descriptor failures are counted and logged, never propagated.

use chrono::{DateTime, Utc};
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::corpus::PersonDescriptor;
use crate::emitter::UpdateEmitter;
use crate::fetcher::{FetchOutcome, ImageFetcher};
use crate::naming::derive_filename;
use crate::resolver::ImageResolver;

/// Aggregate counts of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        write!(
            f,
            "Success: {}, Skipped: {}, Failed: {} ({} persons in {}s)",
            self.succeeded,
            self.skipped,
            self.failed,
            self.total,
            elapsed.num_seconds()
        )
    }
}

/// What happened to a single descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Downloaded,
    AlreadyDone,
    NotFound,
    DownloadFailed,
}

type Sleeper = dyn Fn(Duration) + Send + Sync;

pub struct Pipeline {
    resolver: ImageResolver,
    fetcher: ImageFetcher,
    path_prefix: String,
    delay: Duration,
    sleeper: Box<Sleeper>,
}

impl Pipeline {
    pub fn new(
        resolver: ImageResolver,
        fetcher: ImageFetcher,
        path_prefix: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            path_prefix: path_prefix.into(),
            delay,
            sleeper: Box::new(thread::sleep),
        }
    }

    /// Replace how the politeness delay is waited out.
    pub fn with_sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn from_config(resolver: ImageResolver, fetcher: ImageFetcher, config: &Config) -> Self {
        Self::new(
            resolver,
            fetcher,
            config.output.path_prefix.clone(),
            Duration::from_millis(config.pipeline.delay_ms),
        )
    }

    /// Public path the catalog serves `filename` under.
    pub fn photo_path(&self, filename: &str) -> String {
        format!("{}/{}", self.path_prefix.trim_end_matches('/'), filename)
    }

    /// Process every descriptor, adding one record to `emitter` per person
    /// that has a photo at the end of the step.
    pub fn run(&self, persons: &[PersonDescriptor], emitter: &mut UpdateEmitter) -> RunSummary {
        let started_at = Utc::now();
        let total = persons.len();
        let (mut succeeded, mut skipped, mut failed) = (0, 0, 0);

        for (index, person) in persons.iter().enumerate() {
            let filename = derive_filename(&person.display_name);

            let step = if self.fetcher.existing(&filename).is_some() {
                info!("[{}/{}] {}: already exists, skipping", index + 1, total, person.display_name);
                Step::AlreadyDone
            } else {
                info!(
                    "[{}/{}] {} ({})",
                    index + 1,
                    total,
                    person.display_name,
                    person.original_name.as_deref().unwrap_or("")
                );
                let step = self.enrich(person, &filename);
                // Only descriptors that hit the network pay the delay
                if !self.delay.is_zero() {
                    (self.sleeper)(self.delay);
                }
                step
            };

            match step {
                Step::Downloaded | Step::AlreadyDone => {
                    emitter.record(&person.display_name, &self.photo_path(&filename));
                    if step == Step::Downloaded {
                        succeeded += 1;
                    } else {
                        skipped += 1;
                    }
                }
                Step::NotFound | Step::DownloadFailed => failed += 1,
            }
        }

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            total,
            succeeded,
            skipped,
            failed,
        };
        info!("Done. {}", summary);
        summary
    }

    fn enrich(&self, person: &PersonDescriptor, filename: &str) -> Step {
        let Some(resolution) = self.resolver.resolve(person) else {
            info!("  no image found");
            if let Err(e) = self.fetcher.clear_incomplete(filename) {
                warn!("  could not remove undersized {}: {}", filename, e);
            }
            return Step::NotFound;
        };

        match self.fetcher.fetch(&resolution.url, filename) {
            Ok(FetchOutcome::Downloaded(photo)) => {
                info!("  saved {} ({} KB)", photo.filename, photo.byte_size / 1024);
                Step::Downloaded
            }
            Ok(FetchOutcome::AlreadyPresent(_)) => Step::AlreadyDone,
            Err(e) => {
                warn!("  download of {} failed: {}", resolution.url, e);
                Step::DownloadFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetcherConfig, OutputConfig, ResolverConfig};
    use crate::corpus::extract_records;
    use crate::error::TransportError;
    use crate::fetcher::DiskStore;
    use crate::http::mock::{missing_page, page_with_thumbnail, MockReply, MockTransport};
    use crate::resolver::OverrideTable;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const RU: &str = "https://ru.wikipedia.org/w/api.php";
    const THUMB: &str = "https://upload.wikimedia.org/thumb/1/12/Ivan.jpg/500px-Ivan.jpg";
    const FULL: &str = "https://upload.wikimedia.org/thumb/1/12/Ivan.jpg/800px-Ivan.jpg";

    fn pipeline(transport: Arc<MockTransport>, store: Arc<DiskStore>) -> Pipeline {
        let resolver = ImageResolver::new(
            transport.clone(),
            &ResolverConfig::default(),
            OverrideTable::default(),
        );
        let fetcher = ImageFetcher::new(transport, store, &FetcherConfig::default());
        Pipeline::new(resolver, fetcher, "/uploads/seed", Duration::ZERO)
    }

    /// Serves a thumbnail for every title listed, and a photo of `size` bytes.
    fn wiki(titles: &'static [&'static str], size: usize) -> Arc<MockTransport> {
        Arc::new(MockTransport::new(move |req| match req.param("titles") {
            Some(title) if titles.iter().any(|t| *t == title) => {
                Ok(MockReply::json(page_with_thumbnail(THUMB)))
            }
            Some(_) => Ok(MockReply::json(missing_page())),
            None if req.url == FULL => Ok(MockReply::bytes("image/jpeg", vec![0xFF; size])),
            None => Err(TransportError::Status(404)),
        }))
    }

    #[test]
    fn test_single_record_end_to_end() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        let transport = wiki(&["Иван"], 20_000);
        let persons = extract_records("('Иван', NULL, -100, -50)");
        let mut emitter = UpdateEmitter::new(&OutputConfig::default());

        let summary = pipeline(transport.clone(), store.clone()).run(&persons, &mut emitter);

        assert_eq!((summary.succeeded, summary.skipped, summary.failed), (1, 0, 0));
        assert_eq!(transport.searches(), vec![(RU.to_string(), "Иван".to_string())]);
        assert_eq!(transport.downloads(), vec![FULL.to_string()]);

        let stored = store.path_for("иван_acd41b.jpg");
        assert_eq!(std::fs::metadata(&stored).unwrap().len(), 20_000);

        let statements: Vec<String> = emitter
            .render()
            .lines()
            .filter(|l| l.starts_with("UPDATE"))
            .map(|l| l.to_string())
            .collect();
        assert_eq!(
            statements,
            vec!["UPDATE persons SET main_photo_url = '/uploads/seed/иван_acd41b.jpg' \
                  WHERE name = 'Иван' AND main_photo_url = '/uploads/seed/default.jpg';"
                .to_string()]
        );
    }

    #[test]
    fn test_second_run_skips_completed_work() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        let persons = extract_records(
            "('Иван', NULL, -100, -50),\n('Пётр', NULL, 1672, 1725),\n('Никто', NULL, 1, 2),",
        );

        let mut first_emitter = UpdateEmitter::new(&OutputConfig::default());
        let first = pipeline(wiki(&["Иван", "Пётр"], 4096), store.clone())
            .run(&persons, &mut first_emitter);
        assert_eq!((first.succeeded, first.skipped, first.failed), (2, 0, 1));

        let offline = Arc::new(MockTransport::unreachable());
        let mut second_emitter = UpdateEmitter::new(&OutputConfig::default());
        let second = pipeline(offline.clone(), store).run(&persons, &mut second_emitter);

        assert_eq!(second.skipped, first.succeeded);
        assert_eq!(second.succeeded, 0);
        assert_eq!(second.failed, 1);
        assert!(offline.downloads().is_empty());
        // Only the unresolved person was looked up again
        assert_eq!(offline.searches(), vec![(RU.to_string(), "Никто".to_string())]);
        assert_eq!(second_emitter.records(), first_emitter.records());
    }

    #[test]
    fn test_failed_downloads_are_counted_and_not_recorded() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        let persons = extract_records("('Иван', NULL, -100, -50)");
        let mut emitter = UpdateEmitter::new(&OutputConfig::default());

        let summary = pipeline(wiki(&["Иван"], 200), store).run(&persons, &mut emitter);

        assert_eq!((summary.succeeded, summary.skipped, summary.failed), (0, 0, 1));
        assert!(emitter.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_delay_follows_only_looked_up_persons() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        std::fs::write(store.path_for(&derive_filename("Пётр")), vec![1u8; 4096]).unwrap();

        let transport = wiki(&["Иван"], 4096);
        let resolver = ImageResolver::new(
            transport.clone(),
            &ResolverConfig::default(),
            OverrideTable::default(),
        );
        let fetcher = ImageFetcher::new(transport, store, &FetcherConfig::default());

        let pauses = Arc::new(Mutex::new(Vec::new()));
        let recorded = pauses.clone();
        let pipeline = Pipeline::new(resolver, fetcher, "/uploads/seed", Duration::from_millis(30))
            .with_sleeper(move |d| recorded.lock().unwrap().push(d));

        // Resume-skipped, not found, downloaded
        let persons = extract_records(
            "('Пётр', NULL, 1672, 1725),\n('Никто', NULL, 1, 2),\n('Иван', NULL, -100, -50),",
        );
        let mut emitter = UpdateEmitter::new(&OutputConfig::default());
        let summary = pipeline.run(&persons, &mut emitter);

        assert_eq!((summary.succeeded, summary.skipped, summary.failed), (1, 1, 1));
        assert_eq!(
            *pauses.lock().unwrap(),
            vec![Duration::from_millis(30), Duration::from_millis(30)]
        );
    }

    #[test]
    fn test_zero_delay_never_sleeps() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        let calls = Arc::new(Mutex::new(0usize));
        let counted = calls.clone();
        let pipeline = pipeline(wiki(&["Иван"], 4096), store)
            .with_sleeper(move |_| *counted.lock().unwrap() += 1);

        let persons = extract_records("('Иван', NULL, -100, -50)");
        let mut emitter = UpdateEmitter::new(&OutputConfig::default());
        pipeline.run(&persons, &mut emitter);

        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_not_found_removes_undersized_leftover() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        let leftover = store.path_for(&derive_filename("Никто"));
        std::fs::write(&leftover, b"<html>error</html>").unwrap();

        let persons = extract_records("('Никто', NULL, 1, 2)");
        let mut emitter = UpdateEmitter::new(&OutputConfig::default());
        let summary = pipeline(wiki(&[], 4096), store).run(&persons, &mut emitter);

        assert_eq!(summary.failed, 1);
        assert!(!leftover.exists());
    }

    #[test]
    fn test_photo_path_joins_prefix() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()));
        let transport = Arc::new(MockTransport::unreachable());
        let resolver = ImageResolver::new(
            transport.clone(),
            &ResolverConfig::default(),
            OverrideTable::default(),
        );
        let fetcher = ImageFetcher::new(transport, store, &FetcherConfig::default());
        let pipeline = Pipeline::new(resolver, fetcher, "/media/", Duration::ZERO);

        assert_eq!(pipeline.photo_path("a_123456.jpg"), "/media/a_123456.jpg");
    }
}
