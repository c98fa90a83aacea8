use anyhow::{Context, Result};
use clap::Parser;
use plan_assist::Assistant;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "plan-assist")]
#[command(about = "Natural-language assistant over a production-plan workbook")]
struct Args {
    /// The question, in Bulgarian
    question: String,

    /// Path to the production-plan xlsx workbook (or set PLAN_WORKBOOK)
    #[arg(short, long)]
    workbook: Option<PathBuf>,

    /// Print the full structured response as JSON instead of the message
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let workbook = args
        .workbook
        .or_else(|| std::env::var("PLAN_WORKBOOK").ok().map(PathBuf::from))
        .context("no workbook given: pass --workbook or set PLAN_WORKBOOK")?;

    info!(workbook = %workbook.display(), "starting");

    let assistant = Assistant::new(&workbook);
    let response = assistant.resolve_query(&args.question);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.message);
    }

    if response.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
