use std::time::Duration;

use anyhow::Context;
use deenbot_link::{ConnectionResilienceClient, LinkConfig};
use tokio::sync::broadcast::error::RecvError;

use crate::args::{CliArgs, Command};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let args = CliArgs::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let client = ConnectionResilienceClient::new(config).context("invalid configuration")?;

    let result = match args.command {
        Command::Health => health(&client).await,
        Command::Send { message, user_id } => send(&client, &message, user_id).await,
        Command::Watch { seconds } => watch(&client, seconds).await,
    };
    client.shutdown();
    result
}

fn load_config(args: &CliArgs) -> anyhow::Result<LinkConfig> {
    let mut config = match &args.config {
        Some(path) => LinkConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => LinkConfig::default(),
    };
    if let Some(url) = &args.server_url {
        config.server_url = url.clone();
    }
    Ok(config)
}

async fn health(client: &ConnectionResilienceClient) -> anyhow::Result<()> {
    let healthy = client.perform_health_check().await;
    print_json(&client.connection_stats())?;
    if !healthy {
        anyhow::bail!("{} is not healthy", client.config().server_url);
    }
    Ok(())
}

async fn send(
    client: &ConnectionResilienceClient,
    message: &str,
    user_id: Option<String>,
) -> anyhow::Result<()> {
    if !client.perform_health_check().await {
        // Let the reconnection sequence run its course so the reply can fall back.
        wait_for_settled(client).await;
    }
    let user_id = user_id.or_else(|| client.config().user_id.clone());
    let reply = client.send_message_as(message, user_id).await?;
    print_json(&reply)
}

async fn wait_for_settled(client: &ConnectionResilienceClient) {
    let mut notices = client.subscribe();
    while client.state().is_reconnecting() {
        match notices.recv().await {
            Ok(notice) => log::debug!("{notice:?}"),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

async fn watch(client: &ConnectionResilienceClient, seconds: Option<u64>) -> anyhow::Result<()> {
    let mut notices = client.subscribe();
    client.start()?;

    let deadline = async {
        match seconds {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            notice = notices.recv() => match notice {
                Ok(notice) => print_json(&notice)?,
                Err(RecvError::Lagged(skipped)) => log::warn!("Skipped {skipped} notices"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    print_json(&client.connection_stats())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
