use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use multiseek_search::{Interference, SearchDirection, SearchError};

use crate::commands::{Command, help_text, parse_command};
use crate::document::Document;
use crate::session::SearchController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    document: Document,
    controller: SearchController,
}

impl App {
    pub fn new(document: Document, controller: SearchController) -> Self {
        Self {
            document,
            controller,
        }
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Read commands until input ends or `quit`. `interactive` adds a prompt.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
        interactive: bool,
    ) -> Result<()> {
        if interactive {
            writeln!(out, "type `help` for commands")?;
        }
        let mut lines = input.lines();
        loop {
            if interactive {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("reading command input")?;
            if self.run_line(&line, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    pub fn run_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        self.report_interference(out)?;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let command = match parse_command(line.trim_end_matches(['\r', '\n'])) {
            Ok(command) => command,
            Err(error) => {
                writeln!(out, "error: {}", error)?;
                return Ok(Flow::Continue);
            }
        };

        let flow = self.execute(command, out)?;
        self.report_interference(out)?;
        Ok(flow)
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        let document = &mut self.document;
        let controller = &mut self.controller;

        let result = match command {
            Command::Forward => controller.advance(document, SearchDirection::Forward, false),
            Command::Backward => controller.advance(document, SearchDirection::Backward, false),
            Command::Expand => controller.advance(document, SearchDirection::Forward, true),
            Command::BackwardExpand => {
                controller.advance(document, SearchDirection::Backward, true)
            }
            Command::Type(text) => controller.type_text(document, &text),
            Command::Backspace => controller.backspace(document),
            Command::ToggleCase => controller.toggle_case_sensitivity(document),
            Command::ToggleRegex => controller.toggle_regex(document),
            Command::Stop => {
                if controller.is_active() {
                    controller.cancel(document);
                    writeln!(out, "search cancelled")?;
                }
                return Ok(Flow::Continue);
            }
            Command::Complete => {
                if controller.is_active() {
                    controller.complete();
                    writeln!(out, "search completed")?;
                }
                return Ok(Flow::Continue);
            }
            Command::Select(selections) => {
                document.select(selections);
                return Ok(Flow::Continue);
            }
            Command::Insert { position, text } => {
                document.insert(position, &text);
                return Ok(Flow::Continue);
            }
            Command::Show => {
                writeln!(out, "{}", document.render())?;
                return Ok(Flow::Continue);
            }
            Command::Status => {
                self.write_status(out)?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(out, "{}", help_text())?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        match result {
            Ok(()) => self.write_status(out)?,
            Err(SearchError::Inactive) => {
                writeln!(out, "error: {} (start one with `forward`)", SearchError::Inactive)?
            }
            Err(error) => writeln!(out, "error: {}", error)?,
        }
        Ok(Flow::Continue)
    }

    fn write_status<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.controller.status() {
            Some(status) => writeln!(out, "{}", status)?,
            None => writeln!(out, "no incremental search is active")?,
        }
        Ok(())
    }

    fn report_interference<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let reason = match self.controller.poll_host(&self.document) {
            Some(Interference::SelectionsChanged) => "selections changed",
            Some(Interference::TextChanged) => "text changed",
            None => return Ok(()),
        };
        writeln!(out, "search ended: {}", reason)?;
        Ok(())
    }
}
