//! Replay verification command

use clap::Args;
use infergov_engine::{ReplayVerdict, ReplayVerifier};

use super::StoreArgs;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Receipt to verify, e.g. `<request_id>--receipt`
    pub receipt_id: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.open_store()?;
    let verdict = ReplayVerifier::new(&store).verify(&args.receipt_id)?;

    match verdict {
        ReplayVerdict::Match(report) => {
            println!("match: {}", report.receipt_id);
            println!("  receipt_hash: {}", report.receipt_hash);
            println!("  status: {}", report.status);
            for artifact in &report.verified {
                println!("  verified: {}", artifact);
            }
            Ok(())
        }
        ReplayVerdict::Mismatch(details) => {
            println!("mismatch: {}", args.receipt_id);
            for d in &details {
                println!(
                    "  {} [{}] expected={} actual={}",
                    d.artifact, d.check, d.expected, d.actual
                );
            }
            Err(format!("{} check(s) failed", details.len()).into())
        }
        ReplayVerdict::MissingArtifact(artifact) => {
            println!("missing_artifact: {}", artifact);
            Err(format!("{} is not in the store", artifact).into())
        }
    }
}
