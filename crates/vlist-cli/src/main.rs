mod cli;
mod context;
mod handlers;
mod output;
mod screen;
mod source;

use clap::Parser;
use cli::{Cli, Commands};
use context::CliContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("VLIST_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scroll(args) => {
            let outcome = CliContext::load(cli.config.as_deref()).and_then(|mut ctx| {
                ctx.apply_overrides(&args)?;
                Ok(ctx)
            });
            match outcome {
                Ok(ctx) => handlers::scroll::handle(&ctx, args).await,
                Err(e) => Err(e.into()),
            }
        }
        Commands::Markup(args) => handlers::markup::handle(args),
    };

    if let Err(e) = result {
        output::output_error(&format!("{:#}", e));
    }
    Ok(())
}
