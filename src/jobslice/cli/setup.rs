use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use jobslice::config::ConfigOverrides;
use jobslice::source::SourceFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobslice", bin_name = "jobslice", version)]
#[command(
    about = "Split a flatfile database into sliced work units and submit them as array jobs",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Job work directory
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        help_heading = "Options"
    )]
    pub work_dir: PathBuf,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the query into the work directory and write the worker script
    Prepare {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Submit the prepared worker script as array job(s)
    Submit {
        #[command(flatten)]
        job: JobArgs,

        /// Print the submit commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Prepare, then submit
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Print the submit commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what has been extracted and produced so far
    #[command(alias = "st")]
    Status,

    /// Remove the worker script, outputs, errors and logs
    Clear,

    /// Remove the manifest and extracted input
    Clean,

    /// Remove everything but the saved configuration
    Distclean,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Fasta,
    Flat,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => SourceFormat::Auto,
            FormatArg::Fasta => SourceFormat::Fasta,
            FormatArg::Flat => SourceFormat::Flat,
        }
    }
}

/// Job settings. Anything given here replaces the saved value.
#[derive(Args, Debug, Default, Clone)]
pub struct JobArgs {
    /// Flatfile database to split into work units
    #[arg(short, long, help_heading = "Job")]
    pub query: Option<PathBuf>,

    /// Entry grammar of the query file
    #[arg(long, value_enum, help_heading = "Job")]
    pub format: Option<FormatArg>,

    /// Target database, available to the command as {target}
    #[arg(short, long, help_heading = "Job")]
    pub target: Option<String>,

    /// Command run per work unit, e.g. 'blastp -query {query} -db {target}'
    #[arg(short, long, help_heading = "Job")]
    pub command: Option<String>,

    /// Extra options passed to the launcher, e.g. '-q long.q -l h_vmem=4G'
    #[arg(
        long,
        visible_alias = "sge",
        allow_hyphen_values = true,
        help_heading = "Scheduler"
    )]
    pub scheduler_options: Option<String>,

    /// Submit program
    #[arg(long, help_heading = "Scheduler")]
    pub launcher: Option<String>,

    /// First record to extract (1-based)
    #[arg(long, help_heading = "Ranges")]
    pub index_min: Option<u64>,

    /// Last record to extract
    #[arg(long, help_heading = "Ranges")]
    pub index_max: Option<u64>,

    /// First task to submit
    #[arg(long, help_heading = "Ranges")]
    pub task_min: Option<u64>,

    /// Last task to submit (defaults to the manifest's last index)
    #[arg(long, help_heading = "Ranges")]
    pub task_max: Option<u64>,

    /// Tasks handled by one array task
    #[arg(long, help_heading = "Ranges")]
    pub task_step: Option<u64>,

    /// Work units per slice directory
    #[arg(long, help_heading = "Ranges")]
    pub slice_size: Option<u64>,

    /// Largest task range per submission
    #[arg(long, help_heading = "Ranges")]
    pub array_limit: Option<u64>,
}

impl From<JobArgs> for ConfigOverrides {
    fn from(args: JobArgs) -> Self {
        ConfigOverrides {
            query: args.query,
            format: args.format.map(SourceFormat::from),
            target: args.target,
            command: args.command,
            scheduler_options: args.scheduler_options,
            launcher: args.launcher,
            index_min: args.index_min,
            index_max: args.index_max,
            task_min: args.task_min,
            task_max: args.task_max,
            task_step: args.task_step,
            slice_size: args.slice_size,
            array_limit: args.array_limit,
        }
    }
}
