//! Show a stored artifact

use clap::Args;
use infergov_core::codec;
use infergov_core::model::ArtifactKind;

use super::StoreArgs;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// request, response, error or receipt
    pub kind: String,

    pub artifact_id: String,

    /// Print the stored canonical bytes unchanged
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let kind = ArtifactKind::parse_loose(&args.kind)
        .ok_or_else(|| format!("unknown artifact kind '{}'", args.kind))?;
    let store = args.store.open_store()?;
    let bytes = store.read(kind, &args.artifact_id)?;

    if args.raw {
        println!("{}", String::from_utf8_lossy(&bytes));
    } else {
        let value: serde_json::Value = codec::decode(&bytes)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
