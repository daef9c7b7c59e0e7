use anyhow::Result;
use clap::Args;
use colored::Colorize;
use datagrid_core::{GridConfig, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to write the config into
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Row field used as the stable row key
    #[arg(long, default_value = "id")]
    pub row_key: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs) -> Result<()> {
    let config_path = args.dir.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    if !args.dir.exists() {
        fs::create_dir_all(&args.dir)?;
        println!("  {} Created {}/", "✓".green(), args.dir.display());
    }

    write_config(&config_path, &args.row_key)?;

    println!("  {} Created {}", "✓".green(), config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. List your columns under \"columns\"");
    println!("  2. Run: datagrid replay --data rows.json --script steps.json");

    Ok(())
}

fn write_config(path: &Path, row_key: &str) -> Result<()> {
    let config = GridConfig {
        row_key: row_key.to_string(),
        ..GridConfig::default()
    };
    fs::write(path, config.to_json_string()?)?;
    Ok(())
}
