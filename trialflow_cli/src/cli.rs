use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "trialflow", version, about = "Clinical trial registry ingestion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Page through the registry and append new study versions to the raw store.
    Ingest(IngestArgs),

    /// Print row and study counts of the raw store.
    Stats(StoreArgs),

    /// Print every stored version of one study, newest first, as JSON lines.
    Versions {
        /// Registry identifier, e.g. NCT01234567.
        nct_id: String,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// SQLite database path (else TRIALFLOW_DB_PATH, else data/clinical_trials.db).
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

/// Flags left unset fall back to the `TRIALFLOW_*` environment.
#[derive(Debug, Clone, Default, Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Stop after this many studies were processed.
    #[arg(long)]
    pub max_studies: Option<u64>,

    /// Stop after this many pages were ingested.
    #[arg(long)]
    pub max_pages: Option<u64>,

    #[arg(long)]
    pub page_size: Option<u32>,

    /// Provenance tag stored on every row.
    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ingest_caps() {
        let cli = Cli::try_parse_from([
            "trialflow",
            "ingest",
            "--max-studies",
            "50",
            "--page-size",
            "25",
            "--db-path",
            "/tmp/t.db",
        ])
        .unwrap();
        let Commands::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.max_studies, Some(50));
        assert_eq!(args.page_size, Some(25));
        assert_eq!(args.max_pages, None);
        assert_eq!(args.store.db_path, Some(PathBuf::from("/tmp/t.db")));
    }

    #[test]
    fn versions_takes_positional_id() {
        let cli = Cli::try_parse_from(["trialflow", "versions", "NCT01234567"]).unwrap();
        match cli.command {
            Commands::Versions { nct_id, store } => {
                assert_eq!(nct_id, "NCT01234567");
                assert!(store.db_path.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_caps() {
        assert!(Cli::try_parse_from(["trialflow", "ingest", "--max-pages", "many"]).is_err());
    }
}
