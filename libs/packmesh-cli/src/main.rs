//! Packmesh
//!
//! Meshes a packed bed of spheres inside a box or cylinder container.
//!
//! Usage:
//!     packmesh column.json
//!     packmesh column.json -vv

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use column_mesh::build_model;
use config::MesherConfig;
use preview_kernel::PreviewKernel;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Packed bed column mesher
#[derive(Parser, Debug)]
#[command(name = "packmesh")]
#[command(version)]
#[command(about = "Mesh a packed bed of spheres inside a container", long_about = None)]
struct Cli {
    /// Configuration document (JSON)
    #[arg(name = "CONFIG")]
    config: PathBuf,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_logging(level: &str, timestamps: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = MesherConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_logging(cli.level(), config.output.log_timestamp);
    info!(config = %cli.config.display(), method = ?config.mesh.method, "Starting packmesh");

    let mut kernel = PreviewKernel::new();
    let written = build_model(&config, &mut kernel).context("meshing failed")?;
    for path in &written {
        info!(path = %path.display(), "Wrote");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_and_verbosity() {
        let cli = Cli::try_parse_from(["packmesh", "column.json", "-vv"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("column.json"));
        assert_eq!(cli.level(), "trace");
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["packmesh"]).is_err());
    }
}
