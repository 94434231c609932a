use std::sync::Arc;
use tokio::sync::mpsc;

use invistat::config::Config;
use invistat::engine::Engine;
use invistat::notify::LogNotifier;
use invistat::platform::feed::EventFeed;
use invistat::platform::rest::RestClient;
use invistat::worker::Workers;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invistat=debug".into()),
        )
        .init();

    let config = Config::from_env();
    print_banner(&config);

    let db = invistat::db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    let gateway = Arc::new(RestClient::new(&config.api_url, &config.token));
    let notifier = Arc::new(LogNotifier);
    let engine = Arc::new(
        Engine::new(db, gateway, notifier)
            .with_bot_user_id(config.bot_user_id.clone())
            .with_confirm_timeout(config.confirm_timeout_secs),
    );
    let workers = Arc::new(Workers::new(engine));

    let (tx, mut rx) = mpsc::channel(1024);
    {
        let workers = Arc::clone(&workers);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                workers.dispatch(event).await;
            }
        });
    }

    let feed = EventFeed::new(&config.gateway_url, &config.token);
    loop {
        match feed.run(tx.clone()).await {
            Ok(()) => break,
            Err(e) => {
                tracing::warn!("event feed lost: {e}; reconnecting in 5s");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");

    eprintln!();
    eprintln!("  \x1b[1;36minvistat\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mdatabase\x1b[0m     {}", config.database_url);
    eprintln!("  \x1b[2mapi\x1b[0m          {}", config.api_url);
    eprintln!("  \x1b[2mgateway\x1b[0m      {}", config.gateway_url);
    eprintln!();
}
