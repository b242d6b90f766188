//! Cycle runner and pacing loop.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use cinder_chain::ChainQuery;
use cinder_db::queries::registrations;
use cinder_notify::Dispatcher;
use cinder_types::{ExpiryNotice, HEIGHT_UNKNOWN};

use crate::{predicate::should_fire, MonitorConfig};

/// What one evaluation cycle did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// Cycle aborted because the reference chain height was unknown.
    pub aborted: bool,
    /// Registrations evaluated against the predicate.
    pub evaluated: usize,
    /// Domains skipped over a failed expiry query.
    pub domains_skipped: usize,
    /// Registrations that fired (stamped and handed to the dispatcher).
    pub fired: usize,
    /// Fired registrations whose delivery succeeded.
    pub delivered: usize,
}

/// The expiry evaluation loop.
///
/// One instance runs on one dedicated task; cycles never overlap, and
/// the next tick is scheduled only after the previous cycle (including
/// all of its dispatches) completes.
pub struct Monitor {
    db: Arc<Mutex<Connection>>,
    chain: Arc<dyn ChainQuery>,
    dispatcher: Dispatcher,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        chain: Arc<dyn ChainQuery>,
        dispatcher: Dispatcher,
        config: MonitorConfig,
    ) -> Self {
        Self {
            db,
            chain,
            dispatcher,
            config,
        }
    }

    /// Run cycles until the shutdown signal arrives. An in-flight cycle
    /// always finishes before the loop stops.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            tolerance_blocks = self.config.tolerance_blocks,
            debounce_blocks = self.config.debounce_blocks,
            "expiry monitor started"
        );
        loop {
            match self.run_cycle().await {
                Ok(summary) if summary.aborted => {
                    warn!("evaluation cycle aborted; waiting for next tick");
                }
                Ok(summary) => {
                    debug!(
                        evaluated = summary.evaluated,
                        fired = summary.fired,
                        delivered = summary.delivered,
                        domains_skipped = summary.domains_skipped,
                        "evaluation cycle complete"
                    );
                }
                Err(e) => {
                    error!(error = %e, "evaluation cycle failed");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown.recv() => {
                    info!("expiry monitor stopping");
                    break;
                }
            }
        }
    }

    /// Run one evaluation cycle to completion.
    ///
    /// Fails only if the registration store cannot be read at all;
    /// chain-query and delivery failures are isolated inside the cycle.
    pub async fn run_cycle(&self) -> cinder_db::Result<CycleSummary> {
        let mut summary = CycleSummary::default();

        let all = {
            let conn = self.db.lock().await;
            registrations::list_all(&conn)?
        };
        if all.is_empty() {
            debug!("no registrations; skipping cycle");
            return Ok(summary);
        }

        // One reference height per cycle. Without it nothing downstream
        // can be evaluated safely.
        let current = self.chain.current_height().await;
        if current == HEIGHT_UNKNOWN {
            warn!("current chain height unknown; aborting cycle");
            summary.aborted = true;
            return Ok(summary);
        }

        let mut deliveries = JoinSet::new();

        for (domain, regs) in all {
            let expiry = self.chain.expiry_height(&domain).await;
            if expiry == HEIGHT_UNKNOWN {
                warn!(domain = %domain, "expiry height unknown; skipping domain");
                summary.domains_skipped += 1;
                continue;
            }

            let remaining = expiry - current;
            let notice = ExpiryNotice::new(domain.clone(), remaining);

            for mut reg in regs {
                summary.evaluated += 1;
                if !should_fire(
                    reg.threshold_blocks,
                    remaining,
                    reg.last_fired_height,
                    current,
                    self.config.tolerance_blocks,
                    self.config.debounce_blocks,
                ) {
                    continue;
                }

                // Stamp first, dispatch second. If delivery then fails
                // the notification is lost, which beats refiring it on
                // every crash-loop restart.
                reg.last_fired_height = Some(current);
                {
                    let conn = self.db.lock().await;
                    if let Err(e) = registrations::update(&conn, &domain, &reg) {
                        error!(
                            domain = %domain,
                            id = %reg.id,
                            error = %e,
                            "failed to stamp fire height; registration skipped"
                        );
                        continue;
                    }
                }
                summary.fired += 1;

                info!(
                    domain = %domain,
                    channel = %reg.channel,
                    threshold = reg.threshold_blocks,
                    blocks_remaining = remaining,
                    height = current,
                    "registration fired"
                );

                let dispatcher = self.dispatcher.clone();
                let notice = notice.clone();
                deliveries.spawn(async move { dispatcher.dispatch(&reg, &notice).await });
            }
        }

        // The cycle is not done until every dispatch has been attempted.
        while let Some(result) = deliveries.join_next().await {
            if matches!(result, Ok(true)) {
                summary.delivered += 1;
            }
        }

        Ok(summary)
    }
}
