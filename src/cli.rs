use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-neurovoice",
    version,
    about = "Longitudinal speech-biomarker decline scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Catalog(CatalogArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Patient JSON with calibration and monitored sessions")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, help = "Patient age in years (overrides the input file)")]
    pub age: Option<f64>,

    #[arg(long, help = "Number of leading sessions used as calibration")]
    pub calibration: Option<usize>,

    #[arg(long, help = "Trajectory horizon in weeks")]
    pub weeks: Option<usize>,

    #[arg(long, default_value_t = false, help = "Cross-validate the calibration sessions")]
    pub crossval: bool,

    #[arg(long, help = "Engine config JSON overlay")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Indicator catalog TSV replacing the built-in one")]
    pub catalog: Option<PathBuf>,

    #[arg(long, help = "Topic adjustment TSV (requires --catalog)")]
    pub topics: Option<PathBuf>,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    Show(CatalogShowArgs),
}

#[derive(Debug, Args)]
pub struct CatalogShowArgs {
    #[arg(long, help = "Only list indicators of this domain")]
    pub domain: Option<String>,

    #[arg(long, help = "Indicator catalog TSV replacing the built-in one")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Patient JSON")]
    pub input: PathBuf,

    #[arg(long, help = "Number of leading sessions used as calibration")]
    pub calibration: Option<usize>,

    #[arg(long, help = "Indicator catalog TSV replacing the built-in one")]
    pub catalog: Option<PathBuf>,
}
