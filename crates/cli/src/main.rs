//! `careerverse` -- submit a roadmap generation job and wait for it.
//!
//! Starts the job on the CareerVerse API, polls its progress until the
//! roadmap is ready, and prints the result as JSON on stdout. Progress
//! is logged to stderr. Ctrl-C cancels the job.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                          |
//! |------------------------|----------|-------------------------|--------------------------------------|
//! | `CAREERVERSE_API_URL`  | no       | `http://localhost:8000` | Roadmap API host                     |
//! | `POLL_INTERVAL_MS`     | no       | `300`                   | Milliseconds between progress polls  |
//! | `JOB_TIMEOUT_SECS`     | no       | `300`                   | Overall deadline for one job         |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | Bound on each HTTP request           |
//! | `LOG_FORMAT`           | no       | `text`                  | `text` or `json`                     |
//! | `RUST_LOG`             | no       | `careerverse=info`      | Tracing filter                       |

use careerverse_cli::args::Cli;
use careerverse_cli::config::ClientConfig;
use careerverse_cli::{logging, run};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?.with_overrides(
        cli.api_url,
        cli.poll_interval_ms,
        cli.timeout_secs,
    )?;

    logging::init(config.log_format);

    let (flow, payload) = cli.command.into_job().await?;

    let poll_interval_ms =
        u64::try_from(config.poller.poll_interval.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        flow = %flow,
        api_url = %config.api_url,
        poll_interval_ms,
        timeout_secs = config.poller.timeout.as_secs(),
        "Starting careerverse",
    );

    let roadmap = run::execute(&config, flow, payload).await?;
    println!("{}", serde_json::to_string_pretty(&roadmap)?);

    Ok(())
}
