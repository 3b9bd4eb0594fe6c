use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    load_settings, pipeline, ChannelListCoordinator, ContextStore, NoopNavigator, RenderableMessage,
    SessionManager,
};
use shared::domain::UserId;

mod demo;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the chat configuration file.
    #[arg(long, default_value = "chat.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let settings = load_settings(&args.config)?;
    let user_id = UserId::new(settings.user_id.clone());

    let store = Arc::new(ContextStore::new());
    let session = SessionManager::new(
        demo::DemoBackend::new(),
        settings.identity(),
        settings.user_token.clone(),
        Arc::clone(&store),
    );
    session.connect().await?;

    let coordinator = ChannelListCoordinator::new(Arc::clone(&store), Arc::new(NoopNavigator));
    let channels = coordinator.list_channels(&user_id).await?;
    println!("channels for {user_id}:");
    for channel in &channels {
        println!("  {}  {}", channel.id, channel.display_name(&user_id));
    }

    if let Some(first) = channels.first() {
        coordinator.select(first.clone());
        coordinator.watch(first).await?;
    }

    for message in demo::sample_messages() {
        match pipeline::present(&message) {
            RenderableMessage::Regular {
                text, attachments, ..
            } => {
                println!("message: {text}");
                for attachment in attachments {
                    println!(
                        "  [{:?}] {} ({})",
                        attachment.category, attachment.title, attachment.description
                    );
                }
            }
            RenderableMessage::System { fragment, .. } => {
                println!("system: {}", fragment.as_str());
            }
        }
    }

    session.disconnect().await?;
    Ok(())
}
