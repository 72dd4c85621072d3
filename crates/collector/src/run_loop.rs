//! The collector's run loop (§5 "one concurrent loop per kind, rate-limited
//! externally"): an infinite `loop { tick; sleep }`, modelled on
//! `autopilot::run_loop::RunLoop::run_forever` — failures are logged and
//! swallowed at this level so one bad poll never kills the process.

use std::time::Duration;

use crate::fetcher::EventFetcher;

pub struct RunLoop {
    pub fetcher: Box<dyn EventFetcher>,
    pub fetch_limit: usize,
    pub record_min_age: Duration,
    pub poll_interval: Duration,
}

impl RunLoop {
    pub async fn run_forever(&self) -> ! {
        loop {
            self.single_run().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn single_run(&self) {
        match self.fetcher.fetch_events(self.fetch_limit, self.record_min_age).await {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(fetcher = self.fetcher.name(), count, "fetched events");
                } else {
                    tracing::debug!(fetcher = self.fetcher.name(), "no new events");
                }
            }
            Err(err) => {
                tracing::error!(fetcher = self.fetcher.name(), ?err, "fetch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventFetcher for CountingFetcher {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_events(&self, _fetch_limit: usize, _record_min_age: Duration) -> Result<usize, crate::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn single_run_swallows_errors_and_invokes_fetcher_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let run_loop = RunLoop {
            fetcher: Box::new(CountingFetcher { calls: calls.clone() }),
            fetch_limit: 100,
            record_min_age: Duration::from_secs(60),
            poll_interval: Duration::from_secs(10),
        };
        run_loop.single_run().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
