//! Integration test: the pacing loop around the evaluation cycle.
//!
//! Drives `Monitor::run` itself (the other tests call `run_cycle`
//! directly) under a paused tokio clock:
//! 1. A shutdown signal sent mid-delivery lets the in-flight cycle
//!    finish, delivery included, before the loop stops
//! 2. Consecutive cycles never overlap, even when deliveries take far
//!    longer than the poll interval

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use cinder_chain::StaticChain;
use cinder_db::queries::registrations;
use cinder_monitor::{Monitor, MonitorConfig};
use cinder_notify::{DeliveryChannel, Dispatcher, NotifyError};
use cinder_types::{ChannelKind, ExpiryNotice, Registration};

const DOMAIN: &str = "woodburn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeliveryEvent {
    Started,
    Finished,
}

/// A channel whose deliveries take real (virtual) time, recording when
/// each one starts and finishes. After delivering it advances the chain
/// past the debounce distance so the registration fires every cycle.
struct SlowChannel {
    chain: Arc<StaticChain>,
    next_height: AtomicI64,
    delay: Duration,
    events: StdMutex<Vec<DeliveryEvent>>,
}

impl SlowChannel {
    fn new(chain: Arc<StaticChain>, first_refire_height: i64, delay: Duration) -> Self {
        Self {
            chain,
            next_height: AtomicI64::new(first_refire_height),
            delay,
            events: StdMutex::new(Vec::new()),
        }
    }

    fn events(&self) -> Vec<DeliveryEvent> {
        self.events.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DeliveryChannel for SlowChannel {
    async fn deliver(
        &self,
        _target: &str,
        _notice: &ExpiryNotice,
        _threshold_blocks: i64,
    ) -> Result<(), NotifyError> {
        self.events.lock().expect("lock").push(DeliveryEvent::Started);
        tokio::time::sleep(self.delay).await;
        let height = self.next_height.fetch_add(6, Ordering::SeqCst);
        self.chain.set_height(height);
        self.chain.set_expiry(DOMAIN, height + 100);
        self.events.lock().expect("lock").push(DeliveryEvent::Finished);
        Ok(())
    }
}

struct World {
    channel: Arc<SlowChannel>,
    monitor: Monitor,
}

async fn world(delivery_delay: Duration, poll_interval: Duration) -> World {
    let db = Arc::new(Mutex::new(cinder_db::open_memory().expect("open db")));
    let chain = Arc::new(StaticChain::new(1000));
    chain.set_expiry(DOMAIN, 1100);
    let channel = Arc::new(SlowChannel::new(chain.clone(), 1006, delivery_delay));

    let reg = Registration::new("nathan", ChannelKind::Webhook, "https://hooks.test/1", 100);
    {
        let conn = db.lock().await;
        registrations::add(&conn, DOMAIN, &reg).expect("add");
    }

    let dispatcher = Dispatcher::builder()
        .channel(ChannelKind::Webhook, channel.clone())
        .build();
    let config = MonitorConfig {
        poll_interval,
        ..MonitorConfig::default()
    };
    let monitor = Monitor::new(db, chain, dispatcher, config);
    World { channel, monitor }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_inflight_delivery() {
    let world = world(Duration::from_millis(100), Duration::from_millis(500)).await;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let monitor = world.monitor;
    let handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    // The first cycle starts immediately; its delivery is mid-flight.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(world.channel.events(), vec![DeliveryEvent::Started]);

    // Signal shutdown while the delivery is still sleeping. The loop
    // must finish the cycle before it stops.
    shutdown_tx.send(()).expect("signal");
    handle.await.expect("join");

    assert_eq!(
        world.channel.events(),
        vec![DeliveryEvent::Started, DeliveryEvent::Finished]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cycles_never_overlap_under_slow_delivery() {
    // Deliveries take five poll intervals, so a fixed-rate scheduler
    // would pile cycles on top of each other.
    let world = world(Duration::from_millis(50), Duration::from_millis(10)).await;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let monitor = world.monitor;
    let handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(250)).await;
    shutdown_tx.send(()).expect("signal");
    handle.await.expect("join");

    let events = world.channel.events();
    let started = events
        .iter()
        .filter(|e| **e == DeliveryEvent::Started)
        .count();
    assert!(started >= 2, "expected multiple cycles, saw {started}");

    // Strict start/finish alternation: a second delivery never starts
    // while one is in flight, i.e. cycles are paced end-to-start.
    assert_eq!(events.len() % 2, 0);
    for pair in events.chunks(2) {
        assert_eq!(pair, [DeliveryEvent::Started, DeliveryEvent::Finished]);
    }
}
