//! Registry listing command

use clap::{Args, Subcommand};
use infergov_core::model::ArtifactKind;

use super::StoreArgs;

#[derive(Debug, Args)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommand,
}

#[derive(Debug, Subcommand)]
pub enum RegistryCommand {
    /// List entries in write order
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only entries of this kind (request, response, error, receipt)
    #[arg(long)]
    pub kind: Option<String>,

    /// Only entries that name this artifact as a parent
    #[arg(long, conflicts_with = "kind")]
    pub children_of: Option<String>,

    /// Start after this sequence number
    #[arg(long, default_value_t = 0)]
    pub after: i64,

    #[arg(long, default_value_t = 1000)]
    pub limit: usize,

    /// One JSON object per line instead of columns
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: RegistryArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RegistryCommand::List(list_args) => execute_list(list_args),
    }
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.open_store()?;
    let registry = store.registry();

    let entries = match (&args.kind, &args.children_of) {
        (Some(kind), _) => {
            let kind = ArtifactKind::parse_loose(kind)
                .ok_or_else(|| format!("unknown artifact kind '{}'", kind))?;
            registry.list_kind(kind)?
        }
        (None, Some(parent)) => registry.children_of(parent)?,
        (None, None) => registry.list_after(args.after, args.limit)?,
    };

    for entry in entries
        .iter()
        .filter(|e| e.seq > args.after)
        .take(args.limit)
    {
        if args.json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                entry.seq,
                entry.kind.registry_label(),
                entry.artifact_id,
                entry.sha256,
                entry.byte_size
            );
        }
    }
    Ok(())
}
