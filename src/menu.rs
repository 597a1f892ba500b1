use std::io::{BufRead, Write};

use crate::app;
use crate::cli::OutputFormat;
use crate::error::MemopError;
use crate::model::Threshold;
use crate::process::ProcessHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Trim,
    List,
    TrimAndList,
    Exit,
}

impl MenuChoice {
    /// Map the operator's answer to a choice. `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<u32>().ok()? {
            1 => Some(Self::Trim),
            2 => Some(Self::List),
            3 => Some(Self::TrimAndList),
            4 => Some(Self::Exit),
            _ => None,
        }
    }

    fn trims(self) -> bool {
        matches!(self, Self::Trim | Self::TrimAndList)
    }

    fn lists(self) -> bool {
        matches!(self, Self::List | Self::TrimAndList)
    }
}

/// `y`/`Y`, or `s`/`S` (sí), as the first character means yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim_start().chars().next(),
        Some('y' | 'Y' | 's' | 'S')
    )
}

/// Interactive loop. Returns on the exit choice or at end of input.
///
/// Unparseable answers are rejected and the menu is shown again.
pub fn run_menu<H: ProcessHost + ?Sized>(
    host: &H,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), MemopError> {
    loop {
        write_menu(out).map_err(MemopError::Output)?;
        let Some(line) = read_line(input)? else {
            return finish(out);
        };
        let Some(choice) = MenuChoice::parse(&line) else {
            say(out, "Invalid input. Try again.")?;
            continue;
        };
        if choice == MenuChoice::Exit {
            return Ok(());
        }

        if choice.trims() {
            app::run_trim(host, out)?;
        }
        if !choice.lists() {
            continue;
        }

        prompt(out, "Threshold in MB for listing processes: ")?;
        let Some(line) = read_line(input)? else {
            return finish(out);
        };
        let threshold = match line.trim().parse::<u64>() {
            Ok(mb) => Threshold::from_megabytes(mb),
            Err(_) => {
                say(out, "Invalid threshold. Back to the menu.")?;
                continue;
            }
        };

        prompt(out, "Attempt to terminate the listed processes? (y/n): ")?;
        let Some(answer) = read_line(input)? else {
            return finish(out);
        };
        let kill = is_affirmative(&answer);

        say(out, &format!("Processes using >= {threshold}:"))?;
        app::run_list(host, threshold, kill, OutputFormat::Text, out)?;
    }
}

fn write_menu(w: &mut impl Write) -> std::io::Result<()> {
    writeln!(w)?;
    writeln!(w, "Menu:")?;
    writeln!(w, " 1) Trim this process's memory")?;
    writeln!(w, " 2) List memory-heavy processes (and optionally terminate them)")?;
    writeln!(w, " 3) Trim memory and process the list (1+2)")?;
    writeln!(w, " 4) Exit")?;
    write!(w, "Choose an option: ")?;
    w.flush()
}

/// Read one line. `None` at end of input; invalid UTF-8 is replaced, not fatal.
fn read_line(input: &mut impl BufRead) -> Result<Option<String>, MemopError> {
    let mut buf = Vec::new();
    let n = input
        .read_until(b'\n', &mut buf)
        .map_err(MemopError::Input)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn prompt(out: &mut impl Write, text: &str) -> Result<(), MemopError> {
    write!(out, "{text}")
        .and_then(|()| out.flush())
        .map_err(MemopError::Output)
}

fn say(out: &mut impl Write, text: &str) -> Result<(), MemopError> {
    writeln!(out, "{text}").map_err(MemopError::Output)
}

/// End of input: terminate the dangling prompt line.
fn finish(out: &mut impl Write) -> Result<(), MemopError> {
    writeln!(out)
        .and_then(|()| out.flush())
        .map_err(MemopError::Output)
}
