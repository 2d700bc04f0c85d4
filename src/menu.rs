use std::io::{BufRead, Write};

use crate::command::{self, Command, Flow, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::store::StoreSource;

const PROMPT: &str = "tunedb> ";

/// Reads commands from `input` until `quit` or end of input. Bad input is
/// reported and the prompt shown again. Store and I/O failures of a single
/// command are reported without leaving the menu.
pub fn run<R: BufRead, W: Write>(
    source: &StoreSource,
    config: &Config,
    format: OutputFormat,
    input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}", command::HELP)?;

    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match command::execute(&cmd, source, config, format, out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => {
                warn!("{:?} failed: {}", cmd, e);
                writeln!(out, "error: {}", e)?;
            }
        }
    }

    writeln!(out)?;

    Ok(())
}
