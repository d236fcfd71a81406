//! cache-step - Two-phase object-storage cache step
//!
//! CLI entry point that dispatches the host engine's phase
//! invocations to the protocol core.

use cache_step::cli::{Cli, Commands, PhaseArgs};
use cache_step::context::{ExecutionContext, StepInputs};
use cache_step::credentials::ContextCredentialProvider;
use cache_step::error::{StepError, StepResult};
use cache_step::gateway::OssutilGateway;
use cache_step::phase;
use clap::Parser;
use console::style;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match dispatch().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch() -> StepResult<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("cache_step=warn"),
        1 => EnvFilter::new("cache_step=info"),
        _ => EnvFilter::new("cache_step=debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            let (inputs, context, gateway) = load_phase(&args).await?;
            let result = phase::run(&inputs, &context, &ContextCredentialProvider, &gateway).await;
            // The host captures stdout as the step output slot
            println!("{}", serde_json::to_string(&result.recorded())?);
            Ok(())
        }
        Commands::PostRun(args) => {
            let (inputs, context, gateway) = load_phase(&args).await?;
            phase::post_run(&inputs, &context, &ContextCredentialProvider, &gateway).await;
            Ok(())
        }
    }
}

async fn load_phase(args: &PhaseArgs) -> StepResult<(StepInputs, ExecutionContext, OssutilGateway)> {
    let inputs: StepInputs = read_json(&args.inputs).await?;
    let context: ExecutionContext = read_json(&args.context).await?;
    let gateway = OssutilGateway::new(args.transfer_bin.clone())
        .with_working_directory(context.cwd.clone());
    Ok((inputs, context, gateway))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StepResult<T> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| StepError::io(format!("reading {}", path.display()), e))?;
    Ok(serde_json::from_slice(&raw)?)
}
