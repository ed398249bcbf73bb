use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::error::Result;

impl super::PriceCoordinator {
    /// Run update cycles at the poll interval until shutdown is signalled
    ///
    /// The first cycle runs immediately. Cycles never overlap: a slow cycle
    /// delays the next tick. A shutdown arriving mid-cycle abandons the
    /// in-flight fetch before anything is merged.
    pub async fn run(&mut self, mut shutdown_rx: mpsc::UnboundedReceiver<()>) -> Result<()> {
        self.logger.info(&format!(
            "Starting SDAC coordinator, polling every {}s",
            self.poll_interval.as_secs()
        ));

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let started = Instant::now();
                    tokio::select! {
                        _ = self.refresh() => {}
                        _ = shutdown_rx.recv() => {
                            self.logger.info("Shutdown signal received, abandoning update cycle");
                            break;
                        }
                    }
                    let elapsed = started.elapsed();
                    if elapsed > self.poll_interval {
                        self.logger.warn(&format!(
                            "Update cycle took {} ms, longer than the poll interval",
                            elapsed.as_millis()
                        ));
                    }
                }
                _ = shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }
}
