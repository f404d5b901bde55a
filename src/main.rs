use action_graph::cli::commands::{cmd_graph, cmd_inspect, cmd_offline, cmd_perf};
use action_graph::cli::config::{Cli, Commands, load_config, log_level};
use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", log_level(cli.verbose)),
    )
    .init();

    let config = load_config(cli.config.as_deref());
    let browser = config.browser_for(&cli);
    let classifier = config.classifier();

    match &cli.command {
        Commands::Graph {
            urls,
            output,
            jobs,
            pretty,
        } => {
            let all_ok = cmd_graph(urls, output.as_deref(), *jobs, *pretty, &browser, classifier)?;
            if !all_ok {
                std::process::exit(1);
            }
        }
        Commands::Inspect { url } => {
            cmd_inspect(url, &browser, classifier)?;
        }
        Commands::Offline { input, url, pretty } => {
            cmd_offline(input, url, *pretty, &classifier)?;
        }
        Commands::Perf { urls, runs, output } => {
            // Resolve: CLI > config > defaults
            let runs = runs.unwrap_or(config.perf.runs);
            let output = output.as_deref().unwrap_or(&config.perf.output);
            cmd_perf(urls, runs, output, &browser, &classifier)?;
        }
    }

    Ok(())
}
