use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "structure-sync")]
#[command(
    about = "Rearrange a backup tree to match a source tree by file content fingerprints",
    long_about = None
)]
pub struct Cli {
    /// Emit a progress line every N files (0 disables progress lines)
    #[arg(long, global = true)]
    pub progress_every: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the source (in-use) tree and write the fingerprint mapping
    Scan {
        /// Source directory whose layout is authoritative
        #[arg(long)]
        src: PathBuf,
        /// Mapping file to write [default: file_map.json]
        #[arg(long)]
        map: Option<PathBuf>,
    },
    /// Move files in the target (backup) tree to the paths in the mapping
    Sync {
        /// Target directory to reorganise
        #[arg(long)]
        dst: PathBuf,
        /// Mapping file produced by `scan` [default: file_map.json]
        #[arg(long)]
        map: Option<PathBuf>,
        /// Only show what would be moved
        #[arg(long)]
        dry_run: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["structure-sync", "scan", "--src", "/data/photos"]);
        match cli.command {
            Some(Commands::Scan { src, map }) => {
                assert_eq!(src, PathBuf::from("/data/photos"));
                assert_eq!(map, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sync_with_flags() {
        let cli = Cli::parse_from([
            "structure-sync",
            "sync",
            "--dst",
            "/backup",
            "--map",
            "maps/photos.json",
            "--dry-run",
            "--progress-every",
            "50",
        ]);
        assert_eq!(cli.progress_every, Some(50));
        match cli.command {
            Some(Commands::Sync { dst, map, dry_run }) => {
                assert_eq!(dst, PathBuf::from("/backup"));
                assert_eq!(map, Some(PathBuf::from("maps/photos.json")));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_sync_requires_destination() {
        assert!(Cli::try_parse_from(["structure-sync", "sync"]).is_err());
    }
}
