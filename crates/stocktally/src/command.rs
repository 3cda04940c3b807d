//! Commands typed at the prompt.

use thiserror::Error;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show usage.
    Help,
    /// List configured profiles.
    Profiles,
    /// Switch profile by number or name.
    Profile(String),
    /// Show the numbered item list.
    List,
    /// Add units of an item to a category.
    Add {
        /// Units to add.
        quantity: i64,
        /// Category number or name.
        category: String,
        /// Item name.
        name: String,
    },
    /// Add one unit to the numbered item.
    Increment(usize),
    /// Remove one unit from the numbered item.
    Decrement(usize),
    /// Overwrite the quantity of the numbered item.
    Set {
        /// Item number.
        index: usize,
        /// New quantity.
        quantity: i64,
    },
    /// Move the numbered item to another category.
    Retag {
        /// Item number.
        index: usize,
        /// Category number or name.
        category: String,
    },
    /// Delete the numbered item.
    Remove(usize),
    /// Delete every item.
    Clear,
    /// Set the subject (blank restores the default).
    Subject(String),
    /// Set the text shown before the table.
    Before(String),
    /// Set the text shown after the table.
    After(String),
    /// Set the recipient.
    Recipient(String),
    /// Show the rendered report.
    Preview {
        /// Show HTML instead of plain text.
        html: bool,
    },
    /// E-mail the report.
    Send,
    /// Save the current items as the profile's template.
    Save,
    /// Reload the profile's template at zero quantities.
    Reset,
    /// Leave.
    Quit,
}

/// Reasons a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first word is not a command.
    #[error("Unknown command {0:?}. Type 'help' for a list of commands.")]
    Unknown(String),

    /// A required argument is missing.
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// A number could not be parsed.
    #[error("{0:?} is not a number")]
    NotANumber(String),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing what is wrong with the line.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = split_word(line);
        let command = match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "profiles" => Self::Profiles,
            "profile" => Self::Profile(required(rest, "profile <number|name>")?.to_string()),
            "list" | "ls" => Self::List,
            "add" => {
                const USAGE: &str = "add <quantity> <category> <item name>";
                let (quantity, rest) = split_word(rest);
                let (category, name) = split_word(rest);
                Self::Add {
                    quantity: number(required(quantity, USAGE)?)?,
                    category: required(category, USAGE)?.to_string(),
                    name: required(name, USAGE)?.to_string(),
                }
            }
            "inc" | "+" => Self::Increment(index(rest, "inc <item number>")?),
            "dec" | "-" => Self::Decrement(index(rest, "dec <item number>")?),
            "set" => {
                const USAGE: &str = "set <item number> <quantity>";
                let (item, quantity) = split_word(rest);
                Self::Set {
                    index: index(item, USAGE)?,
                    quantity: number(required(quantity, USAGE)?)?,
                }
            }
            "tag" | "move" => {
                const USAGE: &str = "tag <item number> <category>";
                let (item, category) = split_word(rest);
                Self::Retag {
                    index: index(item, USAGE)?,
                    category: required(category, USAGE)?.to_string(),
                }
            }
            "del" | "rm" => Self::Remove(index(rest, "del <item number>")?),
            "clear" => Self::Clear,
            "subject" => Self::Subject(rest.to_string()),
            "before" => Self::Before(unescape(rest)),
            "after" => Self::After(unescape(rest)),
            "to" => Self::Recipient(rest.to_string()),
            "preview" => Self::Preview {
                html: rest.eq_ignore_ascii_case("html"),
            },
            "send" => Self::Send,
            "save" => Self::Save,
            "reset" => Self::Reset,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(ParseError::Unknown(word.to_string())),
        };
        Ok(Some(command))
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn required<'a>(value: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(value)
    }
}

fn number(value: &str) -> Result<i64, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::NotANumber(value.to_string()))
}

fn index(value: &str, usage: &'static str) -> Result<usize, ParseError> {
    let value = required(value, usage)?;
    value
        .parse()
        .map_err(|_| ParseError::NotANumber(value.to_string()))
}

/// Turns a literal `\n` into a line break so multi-line notes fit on one line.
fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}
