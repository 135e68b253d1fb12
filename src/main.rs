use clap::Parser;
use dbhopper::reporting::TracingReporter;
use dbhopper::{Args, Config, exit_code, run};
use dotenvy;
use std::process;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    //Detect parsing errors in the .env file only.
    if let Err(e @ dotenvy::Error::LineParse(..)) = dotenvy::dotenv() {
        eprintln!("Error parsing .env file\n{e}");
        process::exit(1);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dbhopper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::build(args).unwrap_or_else(|error| {
        error!("{error}");
        process::exit(1);
    });

    let result = run(config, Arc::new(TracingReporter)).await;
    if let Err(e) = &result {
        error!("{e:#}");
    }
    process::exit(exit_code(&result));
}
