use anyhow::Result;
use clap::Parser;
use nextgen_image_cache::app::App;
use nextgen_image_cache::models::{validate_suffix, Config};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "nextgen-check")]
#[command(about = "Report which images need a next-gen conversion")]
struct CliArgs {
    /// Image URLs or filesystem paths to check.
    #[arg(value_name = "URI", required = true)]
    uris: Vec<String>,

    /// Destination suffix, overrides NEXTGEN_DESTINATION_SUFFIX.
    #[arg(long, value_parser = parse_suffix_arg)]
    suffix: Option<String>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_suffix_arg(input: &str) -> std::result::Result<String, String> {
    validate_suffix(input)
        .map(|_| input.to_string())
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nextgen_image_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(suffix) = args.suffix {
        config.destination_suffix = suffix;
    }

    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Checking {} URIs", args.uris.len());
    let statuses = app.run(&args.uris).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        for status in &statuses {
            println!("{}", status);
        }
    }

    Ok(())
}
