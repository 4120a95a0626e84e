use aiupdate::config::Config;
use aiupdate::registry;
use aiupdate::render;
use aiupdate::runner::{self, Status};
use anyhow::Result;
use crossterm::style::Stylize;
use std::io::IsTerminal;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    if std::io::stdout().is_terminal() {
        println!("{}\n", "Updating AI tools...".bold());
    } else {
        println!("Updating AI tools...\n");
    }

    let handle = runner::start(registry::builtin_tools(), &config);
    let renderer = tokio::spawn(render::watch(handle.receivers(), config.tick_interval));

    let states = handle.join().await;
    renderer.await?;

    if states.iter().any(|state| state.status == Status::Failed) {
        std::process::exit(1);
    }
    Ok(())
}
