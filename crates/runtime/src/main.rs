//! # spheretrace
//!
//! Renders sphere scenes to PNG with the sphere tracing kernel. Without
//! `--scene` a built-in demo scene is rendered; with `--watch` the scene file
//! is re-rendered every time it is saved.

#![deny(clippy::all, clippy::pedantic)]

mod app;
mod cli;
mod watcher;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli::Args::parse();
    app::run(&args)
}
