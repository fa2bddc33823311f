use clap::Parser;
use page_triage::cli::commands::{
    CommandContext, cmd_analyze, cmd_classify, cmd_click, cmd_fields, cmd_fill, cmd_health, cmd_process, cmd_scan,
};
use page_triage::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());

    let ctx = CommandContext {
        config: &config,
        port: cli.port,
        trace: cli.trace.as_deref(),
    };

    let ok = match cli.command {
        Commands::Health => cmd_health(&ctx)?,
        Commands::Scan { url, categories, json } => {
            cmd_scan(&ctx, &url, &categories, json)?;
            true
        }
        Commands::Process { url, categories, json } => cmd_process(&ctx, &url, &categories, json)?,
        Commands::Click { url, category, text } => cmd_click(&ctx, &url, category, text.as_deref())?,
        Commands::Fields { url, json } => {
            cmd_fields(&ctx, &url, json)?;
            true
        }
        Commands::Fill { url, values } => cmd_fill(&ctx, &url, &values)?,
        Commands::Analyze {
            url,
            quick,
            export,
            output_dir,
        } => {
            cmd_analyze(&ctx, &url, quick, export, output_dir.as_deref())?;
            true
        }
        Commands::Classify { snapshot, node } => {
            cmd_classify(&snapshot, node)?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
