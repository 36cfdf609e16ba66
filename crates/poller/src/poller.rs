//! Fixed-interval polling over all tracked sections.
//!
//! One sweep runs immediately at startup, then one per configured
//! interval. Sweeps never overlap and shutdown is observed between
//! sweeps only. Within a sweep each item is polled on its own task,
//! bounded by a semaphore so the remote platform sees at most a small
//! fixed number of concurrent sessions.
//!
//! A query failure is scoped to that one item for that one cycle: the
//! stored status stays untouched, nothing is notified, every other item
//! proceeds, and the next cycle retries naturally. No backoff, no
//! escalation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use seatwatch_banner::{evaluate, SectionSource};
use seatwatch_core::config::PollConfig;
use seatwatch_core::{TrackedSection, UserId};
use seatwatch_tracker::WatchStore;

use crate::sink::NotificationSink;

/// Periodic sweep driver.
pub struct Poller {
    store: WatchStore,
    source: Arc<dyn SectionSource>,
    sink: Arc<dyn NotificationSink>,
    config: PollConfig,
}

impl Poller {
    pub fn new(
        store: WatchStore,
        source: Arc<dyn SectionSource>,
        sink: Arc<dyn NotificationSink>,
        config: PollConfig,
    ) -> Self {
        Self {
            store,
            source,
            sink,
            config,
        }
    }

    /// Run until `shutdown` is signaled. The first interval tick fires
    /// immediately, which is the unscheduled startup sweep.
    pub async fn run(&self, shutdown: Arc<Notify>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.interval_secs,
            concurrency = self.config.concurrency,
            "poller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                _ = shutdown.notified() => {
                    info!("poller stopped");
                    break;
                }
            }
        }
    }

    /// One full pass over every tracked section of every user.
    pub async fn sweep(&self) {
        let snapshot = self.store.snapshot().await;
        let total: usize = snapshot.iter().map(|(_, items)| items.len()).sum();
        if total == 0 {
            debug!("sweep skipped, nothing tracked");
            return;
        }
        debug!(items = total, "sweep started");

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut handles = Vec::with_capacity(total);

        for (user, items) in snapshot {
            for item in items {
                let source = Arc::clone(&self.source);
                let sink = Arc::clone(&self.sink);
                let store = self.store.clone();
                let semaphore = Arc::clone(&semaphore);

                handles.push(tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };
                    poll_item(user, item, source.as_ref(), &store, sink.as_ref()).await;
                }));
            }
        }

        for handle in handles {
            let _ = handle.await;
        }
        debug!("sweep finished");
    }
}

/// Poll one tracked section and apply the outcome.
async fn poll_item(
    user: UserId,
    item: TrackedSection,
    source: &dyn SectionSource,
    store: &WatchStore,
    sink: &dyn NotificationSink,
) {
    let records = match source
        .fetch_sections(&item.term, &item.subject, &item.course_number)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            warn!(user, crn = %item.crn, error = %e, "section query failed, keeping last status");
            return;
        }
    };

    // The watched offering may have no record this cycle (e.g. pulled from
    // the catalog); skip silently and keep the stored status.
    let Some(record) = records
        .iter()
        .find(|r| r.matches_watch(&item.crn, &item.section))
    else {
        debug!(user, crn = %item.crn, "no matching offering this cycle");
        return;
    };

    let status = evaluate(record);
    // Edge-triggered: only the closed-to-open transition notifies.
    let became_open = status.is_open && !item.is_open;

    store.update_status(user, &item.crn, status).await;

    if became_open {
        let mut opened = item;
        opened.apply_status(status);
        info!(
            user,
            crn = %opened.crn,
            label = %opened.label(),
            seats = opened.seats_available,
            "section became open"
        );
        if let Err(e) = sink.notify_open(user, &opened).await {
            warn!(user, crn = %opened.crn, error = %e, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use seatwatch_banner::{QueryError, SectionRecord};
    use seatwatch_core::SectionStatus;
    use crate::sink::SinkError;

    /// Source scripted per course number: each sweep consumes the next
    /// queued response for that course.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<HashMap<String, VecDeque<Result<Vec<SectionRecord>, QueryError>>>>,
    }

    impl ScriptedSource {
        fn push(&self, course_number: &str, response: Result<Vec<SectionRecord>, QueryError>) {
            self.responses
                .lock()
                .unwrap()
                .entry(course_number.to_string())
                .or_default()
                .push_back(response);
        }
    }

    #[async_trait]
    impl SectionSource for ScriptedSource {
        async fn fetch_sections(
            &self,
            _term: &str,
            _subject: &str,
            course_number: &str,
        ) -> Result<Vec<SectionRecord>, QueryError> {
            self.responses
                .lock()
                .unwrap()
                .get_mut(course_number)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Sink that records every notification it receives.
    #[derive(Default)]
    struct CapturingSink {
        notified: Mutex<Vec<(UserId, String, u32)>>,
    }

    #[async_trait]
    impl NotificationSink for CapturingSink {
        async fn notify_open(&self, user: UserId, item: &TrackedSection) -> Result<(), SinkError> {
            self.notified
                .lock()
                .unwrap()
                .push((user, item.crn.clone(), item.seats_available));
            Ok(())
        }
    }

    fn record(crn: &str, section: &str, open: bool, seats: i64) -> SectionRecord {
        SectionRecord {
            course_reference_number: crn.into(),
            sequence_number: Some(section.into()),
            seats_available: Some(seats),
            open_section: Some(open),
            ..Default::default()
        }
    }

    fn poller(
        store: WatchStore,
        source: Arc<ScriptedSource>,
        sink: Arc<CapturingSink>,
    ) -> Poller {
        Poller::new(
            store,
            source,
            sink,
            PollConfig {
                interval_secs: 3600,
                concurrency: 2,
            },
        )
    }

    #[tokio::test]
    async fn end_to_end_closed_then_open_notifies_once_with_seats() {
        let store = WatchStore::new();
        store.add(7, "252", "ENGL", "214", "2", "30577").await.unwrap();

        let source = Arc::new(ScriptedSource::default());
        source.push("214", Ok(vec![record("30577", "02", false, 0)]));
        source.push("214", Ok(vec![record("30577", "02", true, 3)]));

        let sink = Arc::new(CapturingSink::default());
        let poller = poller(store.clone(), source, sink.clone());

        poller.sweep().await;
        assert!(sink.notified.lock().unwrap().is_empty());
        assert!(!store.list(7).await[0].is_open);

        poller.sweep().await;
        let notified = sink.notified.lock().unwrap();
        assert_eq!(notified.as_slice(), &[(7, "30577".to_string(), 3)]);
        drop(notified);

        let item = &store.list(7).await[0];
        assert!(item.is_open);
        assert_eq!(item.seats_available, 3);
    }

    #[tokio::test]
    async fn notifications_are_edge_triggered() {
        let store = WatchStore::new();
        store.add(1, "252", "ENGL", "214", "02", "30577").await.unwrap();

        let source = Arc::new(ScriptedSource::default());
        // Closed, closed, open, open, closed, open: transitions at sweeps
        // 3 and 6 only.
        for open in [false, false, true, true, false, true] {
            let seats = if open { 1 } else { 0 };
            source.push("214", Ok(vec![record("30577", "02", open, seats)]));
        }

        let sink = Arc::new(CapturingSink::default());
        let poller = poller(store, source, sink.clone());

        for _ in 0..6 {
            poller.sweep().await;
        }

        assert_eq!(sink.notified.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn query_failure_keeps_status_and_does_not_block_other_items() {
        let store = WatchStore::new();
        store.add(1, "252", "ENGL", "214", "02", "30577").await.unwrap();
        store.add(2, "252", "MATH", "101", "01", "40100").await.unwrap();

        let source = Arc::new(ScriptedSource::default());
        source.push(
            "214",
            Err(QueryError::DeadlineExceeded(Duration::from_secs(30))),
        );
        source.push("101", Ok(vec![record("40100", "01", true, 5)]));

        let sink = Arc::new(CapturingSink::default());
        let poller = poller(store.clone(), source, sink.clone());

        poller.sweep().await;

        // Failed item: untouched. Other user's item: updated and notified.
        assert!(!store.list(1).await[0].is_open);
        assert!(store.list(2).await[0].is_open);
        assert_eq!(
            sink.notified.lock().unwrap().as_slice(),
            &[(2, "40100".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn unmatched_records_are_skipped_silently() {
        let store = WatchStore::new();
        store.add(1, "252", "ENGL", "214", "02", "30577").await.unwrap();
        store
            .update_status(
                1,
                "30577",
                SectionStatus {
                    seats_available: 2,
                    waitlist_open: false,
                    is_open: true,
                },
            )
            .await;

        let source = Arc::new(ScriptedSource::default());
        // Same CRN but different section, and a different CRN entirely.
        source.push(
            "214",
            Ok(vec![
                record("30577", "03", true, 9),
                record("99999", "02", true, 9),
            ]),
        );

        let sink = Arc::new(CapturingSink::default());
        let poller = poller(store.clone(), source, sink.clone());

        poller.sweep().await;

        // No offering matched: stored status stays as it was.
        let item = &store.list(1).await[0];
        assert!(item.is_open);
        assert_eq!(item.seats_available, 2);
        assert!(sink.notified.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_does_startup_sweep_and_stops_on_shutdown() {
        let store = WatchStore::new();
        store.add(1, "252", "ENGL", "214", "02", "30577").await.unwrap();

        let source = Arc::new(ScriptedSource::default());
        source.push("214", Ok(vec![record("30577", "02", true, 4)]));

        let sink = Arc::new(CapturingSink::default());
        let poller = Arc::new(poller(store, source, sink.clone()));

        let shutdown = Arc::new(Notify::new());
        let handle = {
            let poller = Arc::clone(&poller);
            let shutdown = Arc::clone(&shutdown);
            tokio::spawn(async move { poller.run(shutdown).await })
        };

        // notify_one stores a permit, so there is no race with the sweep.
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.notify_one();
        handle.await.unwrap();

        assert_eq!(sink.notified.lock().unwrap().len(), 1);
    }
}
