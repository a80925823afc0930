use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ballot",
    about = "Ballot Store: one administrator, one vote per identity",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ballot state file (overrides `state_path` from the config file).
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Config file; `ballot.toml` is used when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new ballot administered by the given identity
    Init(InitArgs),
    /// Register a candidate (administrator only)
    Add(AddArgs),
    /// Remove a candidate and its tally (administrator only)
    Remove(RemoveArgs),
    /// Cast your single vote
    Vote(VoteArgs),
    /// Show the vote total of a candidate
    Tally(TallyArgs),
    /// Show the number of registered candidates
    Count,
    /// Show the administrator
    Owner,
    /// List candidates with their tallies
    List,
    /// Show the journal of accepted operations
    Log(LogArgs),
    /// Replay the journal and check it reproduces the stored state
    Verify,
}

#[derive(Args)]
pub struct InitArgs {
    /// Administrator identity: 64 hex chars, or a label to derive one from.
    /// A random identity is generated when omitted.
    #[arg(long)]
    pub admin: Option<String>,
    /// Overwrite an existing state file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    pub name: String,
    /// Caller identity
    #[arg(long = "as")]
    pub caller: String,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Candidate id, e.g. `2` or `#2`
    pub candidate: String,
    #[arg(long = "as")]
    pub caller: String,
}

#[derive(Args)]
pub struct VoteArgs {
    pub candidate: String,
    #[arg(long = "as")]
    pub voter: String,
}

#[derive(Args)]
pub struct TallyArgs {
    pub candidate: String,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}
