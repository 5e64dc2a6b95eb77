use std::fmt;

use multiseek_search::{Position, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub action: CommandAction,
    pub config_name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

const fn command(
    action: CommandAction,
    config_name: &'static str,
    usage: &'static str,
    summary: &'static str,
) -> CommandSpec {
    CommandSpec {
        action,
        config_name,
        usage,
        summary,
    }
}

macro_rules! define_commands {
    ($(($variant:ident, $config_name:literal, $usage:literal, $summary:literal)),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CommandAction {
            $( $variant, )+
        }

        const COMMAND_SPECS: &[CommandSpec] = &[
            $(command(CommandAction::$variant, $config_name, $usage, $summary),)+
        ];

        impl CommandAction {
            pub fn specs() -> &'static [CommandSpec] {
                COMMAND_SPECS
            }

            #[cfg(test)]
            pub fn all() -> impl std::iter::ExactSizeIterator<Item = Self> + Clone {
                COMMAND_SPECS.iter().map(|spec| spec.action)
            }

            pub fn from_config_name(name: &str) -> Option<Self> {
                let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
                COMMAND_SPECS
                    .iter()
                    .find_map(|spec| (spec.config_name == normalized).then_some(spec.action))
            }

            pub fn config_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $config_name,)+
                }
            }
        }
    };
}

define_commands!(
    (Forward, "forward", "forward", "start a search, or jump every cursor to its next match"),
    (Backward, "backward", "backward", "start a backward search, or jump to the previous match"),
    (Expand, "expand", "expand", "like forward, but keep the selections found so far"),
    (
        BackwardExpand,
        "backward_expand",
        "backward-expand",
        "like backward, but keep the selections found so far"
    ),
    (Type, "type", "type <text>", "append text to the search term"),
    (Backspace, "backspace", "backspace", "drop the last character of the search term"),
    (ToggleCase, "toggle_case", "toggle-case", "toggle case sensitivity"),
    (ToggleRegex, "toggle_regex", "toggle-regex", "toggle regular expressions"),
    (Stop, "stop", "stop", "cancel the search and restore the previous selections"),
    (Complete, "complete", "complete", "keep the found selections and end the search"),
    (
        Select,
        "select",
        "select <line:col[-line:col]>...",
        "replace the selections, as another tool would"
    ),
    (Insert, "insert", "insert <line:col> <text>", "insert text, as another tool would"),
    (Show, "show", "show", "print the document with its selections"),
    (Status, "status", "status", "print the search status line"),
    (Help, "help", "help", "list commands"),
    (Quit, "quit", "quit", "exit"),
);

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Forward,
    Backward,
    Expand,
    BackwardExpand,
    Type(String),
    Backspace,
    ToggleCase,
    ToggleRegex,
    Stop,
    Complete,
    Select(Vec<Selection>),
    Insert { position: Position, text: String },
    Show,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    UnexpectedArgument {
        command: &'static str,
    },
    InvalidPosition(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::Unknown(name) => write!(f, "unknown command `{}` (try `help`)", name),
            Self::MissingArgument { command, argument } => {
                write!(f, "`{}` needs {}", command, argument)
            }
            Self::UnexpectedArgument { command } => {
                write!(f, "`{}` takes no arguments", command)
            }
            Self::InvalidPosition(text) => {
                write!(f, "invalid position `{}`, expected LINE:COL", text)
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_start();
    let (name, rest) = match line.find(char::is_whitespace) {
        Some(split) => (&line[..split], &line[split..]),
        None => (line, ""),
    };
    if name.is_empty() {
        return Err(CommandError::Empty);
    }
    let action =
        CommandAction::from_config_name(name).ok_or_else(|| CommandError::Unknown(name.into()))?;

    let command = match action {
        CommandAction::Type => {
            // Only the separator is dropped so that typed spaces survive.
            let text = rest.strip_prefix(' ').unwrap_or(rest);
            if text.is_empty() {
                return Err(missing(action, "the text to type"));
            }
            Command::Type(unescape(text))
        }
        CommandAction::Select => {
            let selections = rest
                .split_whitespace()
                .map(parse_selection)
                .collect::<Result<Vec<_>, _>>()?;
            if selections.is_empty() {
                return Err(missing(action, "at least one selection"));
            }
            Command::Select(selections)
        }
        CommandAction::Insert => {
            let rest = rest.trim_start();
            let (at, text) = rest.split_once(' ').unwrap_or((rest, ""));
            if at.is_empty() {
                return Err(missing(action, "a position"));
            }
            if text.is_empty() {
                return Err(missing(action, "the text to insert"));
            }
            Command::Insert {
                position: parse_position(at)?,
                text: unescape(text),
            }
        }
        CommandAction::Forward => no_arguments(action, rest, Command::Forward)?,
        CommandAction::Backward => no_arguments(action, rest, Command::Backward)?,
        CommandAction::Expand => no_arguments(action, rest, Command::Expand)?,
        CommandAction::BackwardExpand => no_arguments(action, rest, Command::BackwardExpand)?,
        CommandAction::Backspace => no_arguments(action, rest, Command::Backspace)?,
        CommandAction::ToggleCase => no_arguments(action, rest, Command::ToggleCase)?,
        CommandAction::ToggleRegex => no_arguments(action, rest, Command::ToggleRegex)?,
        CommandAction::Stop => no_arguments(action, rest, Command::Stop)?,
        CommandAction::Complete => no_arguments(action, rest, Command::Complete)?,
        CommandAction::Show => no_arguments(action, rest, Command::Show)?,
        CommandAction::Status => no_arguments(action, rest, Command::Status)?,
        CommandAction::Help => no_arguments(action, rest, Command::Help)?,
        CommandAction::Quit => no_arguments(action, rest, Command::Quit)?,
    };
    Ok(command)
}

/// `LINE:COL`, both zero-based.
pub fn parse_position(text: &str) -> Result<Position, CommandError> {
    let invalid = || CommandError::InvalidPosition(text.to_string());
    let (line, column) = text.split_once(':').ok_or_else(invalid)?;
    let line = line.trim().parse().map_err(|_| invalid())?;
    let column = column.trim().parse().map_err(|_| invalid())?;
    Ok(Position::new(line, column))
}

/// `LINE:COL` for a cursor or `LINE:COL-LINE:COL` for anchor then active end.
pub fn parse_selection(text: &str) -> Result<Selection, CommandError> {
    match text.split_once('-') {
        Some((anchor, active)) => Ok(Selection::new(
            parse_position(anchor)?,
            parse_position(active)?,
        )),
        None => Ok(Selection::cursor(parse_position(text)?)),
    }
}

pub fn help_text() -> String {
    let width = CommandAction::specs()
        .iter()
        .map(|spec| spec.usage.len())
        .max()
        .unwrap_or(0);
    CommandAction::specs()
        .iter()
        .map(|spec| format!("  {:width$}  {}", spec.usage, spec.summary, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn no_arguments(action: CommandAction, rest: &str, command: Command) -> Result<Command, CommandError> {
    if rest.trim().is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnexpectedArgument {
            command: action.config_name(),
        })
    }
}

fn missing(action: CommandAction, argument: &'static str) -> CommandError {
    CommandError::MissingArgument {
        command: action.config_name(),
        argument,
    }
}

/// Expands `\n`, `\t` and `\\` so line breaks can be typed on one line.
fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}
