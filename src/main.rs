use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod adapters;
mod cache;
mod cli;
mod config;
mod errors;
mod factory;
mod http;
mod link;
mod metadata;
mod query;
mod resolver;
mod search_id;
mod shortener;
mod stats;
#[cfg(test)]
mod tests;
mod verify;
mod web;

use factory::AppFactory;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_logging();

    let paths = AppFactory::get_paths(args.config.as_deref())?;
    let config = AppFactory::create_config(&paths)?;
    let resolver = AppFactory::create_resolver(&config, &paths)?;

    match args.command {
        cli::Command::Daemon {} => {
            web::start_daemon(resolver, &config.listen)?;
        }

        cli::Command::Resolve { link, adapters } => {
            let result = resolver.resolve(&link, Some(adapters.as_slice()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        cli::Command::Lookup { id } => match resolver.lookup(&id) {
            Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
            Err(errors::ResolveError::NotFound) => println!("not found"),
            Err(err) => return Err(err).context("lookup failed"),
        },

        cli::Command::Parse { link } => {
            let parsed = resolver.parse(&link)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
    }

    Ok(())
}
