use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::config::MultilineMode;
use crate::core::error::MatchError;

pub const TRIGGERS_PROMPT: &str = "triggers? (space separated list of strings): ";
pub const REPLACE_PROMPT: &str = "replace with? (supports multiline): ";

const EOF_MARKER: &str = "EOF";

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Prints `message` and returns the next line with surrounding whitespace trimmed.
    pub fn read_line(&mut self, message: &str) -> Result<String> {
        self.show(message)?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            bail!("unexpected end of input");
        }

        Ok(line.trim().to_string())
    }

    pub fn read_triggers(&mut self) -> Result<Vec<String>> {
        let line = self.read_line(TRIGGERS_PROMPT)?;
        Ok(parse_triggers(&line)?)
    }

    /// Reads a possibly multiline value, lines joined with `\n`.
    pub fn read_multiline(&mut self, message: &str, mode: MultilineMode) -> Result<String> {
        self.show(message)?;
        let hint = match mode {
            MultilineMode::Messaging => {
                "(Press Enter twice (empty line) to submit, single Enter for new line)"
            }
            MultilineMode::Eof => "(Type 'EOF' on a new line when finished, or press Ctrl+D)",
        };
        writeln!(self.writer, "{hint}").context("failed to write prompt")?;
        self.writer.flush().context("failed to write prompt")?;

        let mut lines: Vec<String> = Vec::new();
        loop {
            let mut raw = String::new();
            let read = self
                .reader
                .read_line(&mut raw)
                .context("failed to read input")?;
            if read == 0 {
                break;
            }

            let line = raw.strip_suffix('\n').unwrap_or(raw.as_str());
            let line = line.strip_suffix('\r').unwrap_or(line);
            let done = match mode {
                MultilineMode::Messaging => line.is_empty() && !lines.is_empty(),
                MultilineMode::Eof => line == EOF_MARKER,
            };
            if done {
                break;
            }
            lines.push(line.to_string());
        }

        Ok(lines.join("\n"))
    }

    fn show(&mut self, message: &str) -> Result<()> {
        write!(self.writer, "{message}").context("failed to write prompt")?;
        self.writer.flush().context("failed to write prompt")
    }
}

/// Splits a whitespace-separated trigger list. Fails when nothing usable remains.
pub fn parse_triggers(line: &str) -> Result<Vec<String>, MatchError> {
    let triggers: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if triggers.is_empty() {
        return Err(MatchError::NoTriggers);
    }
    Ok(triggers)
}
