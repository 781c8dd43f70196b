use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mds_core::report::TracingReporter;
use mds_core::runner::Runner;
use mds_core::spec::{parse_data_sets, parse_mb, DataSetRequest, MasterDataSetSpec};

#[derive(Parser)]
#[command(name="mds", version, about="Generate, grow and back up a master data set")]
struct Cli {
    /// Print the run summary as JSON on stdout
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

/// `name1,size1,name2,size2,...`
#[derive(Clone, Debug)]
struct DataSets(Vec<DataSetRequest>);

fn data_sets_arg(s: &str) -> Result<DataSets, String> {
    parse_data_sets(s).map(DataSets).map_err(|e| format!("{:#}", e))
}

fn mb_arg(s: &str) -> Result<u64, String> {
    parse_mb(s).map_err(|e| format!("{:#}", e))
}

#[derive(Subcommand)]
enum Cmd {
    /// Create data sets made of fixed-size random text files
    #[command(alias = "GENERATE")]
    Generate {
        input_folder: PathBuf,
        /// Max size of each file in MB
        #[arg(value_parser = mb_arg)]
        file_size_mb: u64,
        /// name1,size1,name2,size2,... (sizes in MB)
        #[arg(value_parser = data_sets_arg)]
        data_sets: DataSets,
    },
    /// Grow existing data sets by the given number of MB
    #[command(alias = "UPDATE")]
    Update {
        input_folder: PathBuf,
        /// name1,size1,name2,size2,... (sizes to add, in MB)
        #[arg(value_parser = data_sets_arg)]
        data_sets: DataSets,
    },
    /// Copy the input folder under the backup folder, rotating any previous copy
    #[command(alias = "BACKUP")]
    Backup {
        input_folder: PathBuf,
        backup_folder: PathBuf,
        #[arg(long, default_value_t = false)]
        preserve_attributes: bool,
    },
    /// Delete the input folder and everything in it
    Clean { input_folder: PathBuf },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    let reporter = TracingReporter;
    let runner = Runner::new(&reporter);

    let spec = match cli.cmd {
        Cmd::Generate { input_folder, file_size_mb, data_sets } => {
            MasterDataSetSpec::generate(input_folder, file_size_mb, data_sets.0)
        }
        Cmd::Update { input_folder, data_sets } => MasterDataSetSpec::update(input_folder, data_sets.0),
        Cmd::Backup { input_folder, backup_folder, preserve_attributes } => MasterDataSetSpec {
            preserve_attributes,
            ..MasterDataSetSpec::backup(input_folder, backup_folder)
        },
        Cmd::Clean { input_folder } => {
            runner.clean(&input_folder)?;
            return Ok(());
        }
    };

    tracing::info!("Running master data set with specification: {:?}", spec);
    let summary = runner.run(&spec)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    let failed = summary.failures();
    if failed > 0 {
        bail!("{} data set(s) failed", failed);
    }
    Ok(())
}
