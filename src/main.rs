use clap::Parser;
use miette::Result;
use stockpile::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let default_filter = match cli.global.verbose {
        0 => "stockpile=warn",
        1 => "stockpile=info",
        _ => "stockpile=debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Run => stockpile::cli::commands::run::run(&global),
        Commands::Consumption(args) => stockpile::cli::commands::consumption::run(args, &global),
        Commands::Forecast(args) => stockpile::cli::commands::forecast::run(args, &global),
        Commands::Recommend(args) => stockpile::cli::commands::recommend::run(args, &global),
        Commands::Audit(args) => stockpile::cli::commands::audit::run(args, &global),
        Commands::Status => stockpile::cli::commands::status::run(&global),
        Commands::Ingest(args) => stockpile::cli::commands::ingest::run(args, &global),
        Commands::Completions(args) => stockpile::cli::commands::completions::run(args),
    }
}
