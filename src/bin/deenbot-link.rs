#[path = "deenbot-link/app.rs"]
mod app;
#[path = "deenbot-link/args.rs"]
mod args;
#[path = "deenbot-link/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
