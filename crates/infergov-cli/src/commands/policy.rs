//! Policy matrix commands

use clap::{Args, Subcommand};
use infergov_core::policy::PolicyMatrix;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Load and validate a policy matrix (baseline when no file is given)
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub path: Option<PathBuf>,
}

pub fn execute(args: PolicyArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        PolicyCommand::Check(check_args) => execute_check(check_args),
    }
}

fn execute_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let matrix = match &args.path {
        Some(path) => PolicyMatrix::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => PolicyMatrix::baseline(),
    };

    println!("policy ok: {}", matrix.version);
    for (provider, policy) in &matrix.providers {
        println!(
            "  {}: max_output_tokens={} models={}",
            provider,
            policy.max_output_tokens,
            policy.allowed_models.join(",")
        );
    }
    println!("  require_system_prompt={}", matrix.require_system_prompt);
    println!("  provider_timeout_ms={}", matrix.provider_timeout_ms);
    if !matrix.forbidden_fields.is_empty() {
        println!("  forbidden_fields={}", matrix.forbidden_fields.join(","));
    }
    Ok(())
}
