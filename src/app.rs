use std::ffi::OsString;
use std::io::{BufRead, Write};

use clap::Parser;
use clap::error::ErrorKind;

use crate::cli::{self, Cli, Command, OutputFormat};
use crate::error::MemopError;
use crate::menu;
use crate::model::{ProcessRecord, Threshold};
use crate::output::{self, text};
use crate::privilege;
use crate::process::{self, ProcessHost};
use crate::trim;

pub const PROGRAM: &str = "memoproc";

/// Exit code for bad usage and for runtime failures alike.
pub const EXIT_FAILURE: i32 = 1;

/// What the command line asked for.
#[derive(Debug)]
pub enum Invocation {
    /// Run a command; `None` starts the interactive menu.
    Run(Option<Command>),
    /// `--help` or `--version`: print the rendered text and succeed.
    Info(String),
}

/// Parse the command line without exiting the process on failure.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, MemopError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(cli.command)),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Invocation::Info(e.render().to_string()))
            }
            _ => Err(MemopError::Usage(e.render().to_string())),
        },
    }
}

/// Parse `args`, run the command against `host`, and return the exit code.
///
/// Usage errors print the clap diagnostic on stderr and the usage text on
/// `out`, then return 1.
pub fn dispatch<H, I, T>(
    args: I,
    host: &H,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> i32
where
    H: ProcessHost + ?Sized,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let command = match parse_args(args) {
        Ok(Invocation::Run(command)) => command,
        Ok(Invocation::Info(text)) => {
            return match out.write_all(text.as_bytes()) {
                Ok(()) => 0,
                Err(_) => EXIT_FAILURE,
            };
        }
        Err(e) => {
            eprint!("{e}");
            let _ = out.write_all(cli::usage(PROGRAM).as_bytes());
            let _ = out.flush();
            return EXIT_FAILURE;
        }
    };

    match execute(command, host, input, out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            EXIT_FAILURE
        }
    }
}

/// Run one parsed command to completion.
pub fn execute<H: ProcessHost + ?Sized>(
    command: Option<Command>,
    host: &H,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), MemopError> {
    match command {
        None => menu::run_menu(host, input, out),
        Some(Command::Trim) => run_trim(host, out),
        Some(Command::List(args)) => run_list(
            host,
            Threshold::from_megabytes(args.threshold_mb),
            args.kill,
            args.format,
            out,
        ),
        Some(Command::Alt) => run_alt(host, out),
    }
}

/// Trim this process's working set and print the before/after report.
pub fn run_trim<H: ProcessHost + ?Sized>(host: &H, out: &mut impl Write) -> Result<(), MemopError> {
    let report = trim::trim_working_set(host);
    text::write_trim_report(&report, out)?;
    out.flush().map_err(MemopError::Output)
}

/// Print processes at or above `threshold`; with `kill`, then try to
/// terminate each of them in listing order.
///
/// The listing is complete before the first termination attempt. Between the
/// two, processes may exit and identifiers may be reused; that race is not
/// guarded against.
pub fn run_list<H: ProcessHost + ?Sized>(
    host: &H,
    threshold: Threshold,
    kill: bool,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), MemopError> {
    let records = scan(host, threshold);
    output::write_listing(&records, threshold, format, out)?;
    out.flush().map_err(MemopError::Output)?;

    if kill && !records.is_empty() {
        privilege::warn_if_unprivileged();
        for report in process::terminate_all(host, &records) {
            text::write_termination(&report, out)?;
        }
        out.flush().map_err(MemopError::Output)?;
    }
    Ok(())
}

/// Demonstration entry: trim, then point at the real commands.
pub fn run_alt<H: ProcessHost + ?Sized>(host: &H, out: &mut impl Write) -> Result<(), MemopError> {
    writeln!(out, "Alternate main: trimming current process working set...")
        .map_err(MemopError::Output)?;
    run_trim(host, out)?;
    writeln!(
        out,
        "Done. Use the program with arguments to list/kill processes."
    )
    .map_err(MemopError::Output)?;
    out.flush().map_err(MemopError::Output)
}

/// Enumerate, treating an unreadable process table as empty.
fn scan<H: ProcessHost + ?Sized>(host: &H, threshold: Threshold) -> Vec<ProcessRecord> {
    match process::high_memory_processes(host, threshold) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("process table unavailable: {e}");
            Vec::new()
        }
    }
}
