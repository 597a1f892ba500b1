use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "memoproc",
    version,
    about = "Trim this process's working set and find (or stop) memory-heavy processes"
)]
pub struct Cli {
    /// Without a subcommand, an interactive menu is started
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the OS to trim the working set of this process
    Trim,
    /// List processes using at least THRESHOLD_MB of resident memory
    List(ListArgs),
    /// Demonstration: trim, then exit
    Alt,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Resident memory threshold in megabytes (inclusive)
    #[arg(value_name = "THRESHOLD_MB", value_parser = validate_threshold)]
    pub threshold_mb: u64,

    /// Attempt to terminate every listed process (use with care)
    #[arg(long, conflicts_with = "format")]
    pub kill: bool,

    /// Output format [default: text]
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Tsv,
    Json,
}

fn validate_threshold(s: &str) -> Result<u64, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a whole number of megabytes"))
}

/// Plain usage text printed when the arguments cannot be understood.
pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} trim\n  {program} list <thresholdMB> [--kill]\n  {program} alt\n"
    )
}
