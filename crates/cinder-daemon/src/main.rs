//! cinderd: the domain expiry alerting daemon.
//!
//! Single OS process running a Tokio async runtime. One background task
//! runs the expiry evaluation loop; registrations and chat links are
//! managed out-of-band through the shared SQLite database.

mod config;
mod links;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::info;

use cinder_chain::{ChainQuery, HsdClient, HsdNetwork};
use cinder_monitor::Monitor;
use cinder_notify::{ChatChannel, Dispatcher, EmailChannel, WebhookChannel};
use cinder_types::ChannelKind;

use crate::config::DaemonConfig;
use crate::links::DbHandleLinks;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cinder=info".parse()?),
        )
        .init();

    info!("cinder daemon starting");

    // 1. Load config
    let config = DaemonConfig::load()?;
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 2. Open database
    let db_path = data_dir.join("cinder.db");
    let conn = cinder_db::open(&db_path)?;
    let db = Arc::new(Mutex::new(conn));

    // 3. Chain client
    let network = HsdNetwork::from_name(&config.node.network);
    let api_key = (!config.node.api_key.is_empty()).then_some(config.node.api_key.as_str());
    let chain: Arc<dyn ChainQuery> = Arc::new(HsdClient::new(&config.node.host, api_key, network)?);
    info!(host = %config.node.host, network = %config.node.network, "chain client ready");

    // 4. Delivery channels, each an injected dependency of the
    //    dispatcher rather than process-global state
    let mut dispatcher = Dispatcher::builder()
        .max_concurrent(config.monitor.max_concurrent_deliveries)
        .channel(
            ChannelKind::Webhook,
            Arc::new(WebhookChannel::new(
                config.alerts.sender_name.clone(),
                config.alerts.account_base.clone(),
            )?),
        );

    if config.email_enabled() {
        let credentials = (!config.smtp.username.is_empty() && !config.smtp.password.is_empty())
            .then(|| (config.smtp.username.clone(), config.smtp.password.clone()));
        dispatcher = dispatcher.channel(
            ChannelKind::Email,
            Arc::new(EmailChannel::new(
                &config.smtp.server,
                config.smtp.port,
                credentials,
                &config.smtp.from_address,
                config.alerts.sender_name.clone(),
                config.alerts.account_base.clone(),
            )?),
        );
        info!(server = %config.smtp.server, "email channel enabled");
    }

    if config.chat_enabled() {
        let links = Arc::new(DbHandleLinks::new(db.clone()));
        dispatcher = dispatcher.channel(
            ChannelKind::Chat,
            Arc::new(ChatChannel::new(&config.chat.bot_token, links)?),
        );
        info!("chat channel enabled");
    }

    let dispatcher = dispatcher.build();

    // 5. Shutdown channel
    let (shutdown_tx, _) = broadcast::channel(1);

    // 6. Start the evaluation loop
    let monitor = Monitor::new(db, chain, dispatcher, config.monitor_config());
    let monitor_shutdown = shutdown_tx.subscribe();
    let monitor_task = tokio::spawn(async move { monitor.run(monitor_shutdown).await });

    // 7. Wait for ctrl-c, then let the in-flight cycle finish
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");
    let _ = shutdown_tx.send(());
    monitor_task.await?;

    info!("cinder daemon stopped");
    Ok(())
}
