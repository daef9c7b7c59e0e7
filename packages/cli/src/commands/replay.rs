use crate::script::{parse_rows, parse_script, Session};
use anyhow::{Context, Result};
use clap::Args;
use datagrid_core::GridConfig;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON array of row objects
    #[arg(short, long)]
    pub data: PathBuf,

    /// JSON array of steps
    #[arg(short, long)]
    pub script: PathBuf,

    /// Config file (defaults to ./datagrid.config.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn replay(args: ReplayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => GridConfig::load_file(path)?,
        None => GridConfig::load(std::env::current_dir()?)?,
    };

    let rows = fs::read_to_string(&args.data)
        .with_context(|| format!("cannot read {}", args.data.display()))?;
    let rows = parse_rows(&rows)?;
    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("cannot read {}", args.script.display()))?;
    let steps = parse_script(&script)?;

    info!(rows = rows.len(), steps = steps.len(), "Replaying script");
    let session = Session::new(rows, &config)?;
    session.run(&steps).await?;

    println!("{}", serde_json::to_string_pretty(&session.report())?);
    Ok(())
}
