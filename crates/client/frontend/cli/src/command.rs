//! Console command grammar.
use std::str::FromStr;

use battle_core::Position;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Grid click at `x y`.
    Click(Position),
    /// Arm targeting for an ability id.
    Target(String),
    /// Activate hotbar key 1..=3.
    Slot(usize),
    Bind { key: usize, skill_id: String },
    Skills,
    End,
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  start          start the battle
  click X Y      move, or pick a target while targeting
  target ID      target with an ability
  slot N         use the ability bound to key N
  bind N ID      bind an ability to key N (1-3)
  skills         list known abilities
  end            end your turn
  status         show the player card and turn
  quit           leave";

impl Command {
    /// Parses one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("start", []) => Self::Start,
            ("click", [x, y]) => Self::Click(Position::new(
                number(x, "click X Y")?,
                number(y, "click X Y")?,
            )),
            ("click", _) => return Err(CommandError::Usage("click X Y")),
            ("target", [id]) => Self::Target(id.to_string()),
            ("target", _) => return Err(CommandError::Usage("target ID")),
            ("slot", [key]) => Self::Slot(number(key, "slot N")?),
            ("slot", _) => return Err(CommandError::Usage("slot N")),
            ("bind", [key, id]) => Self::Bind {
                key: number(key, "bind N ID")?,
                skill_id: id.to_string(),
            },
            ("bind", _) => return Err(CommandError::Usage("bind N ID")),
            ("skills", []) => Self::Skills,
            ("end", []) => Self::End,
            ("status", []) => Self::Status,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(CommandError::Unknown(head.to_string())),
        };
        Ok(Some(command))
    }
}

fn number<T: FromStr>(word: &str, usage: &'static str) -> Result<T, CommandError> {
    word.parse().map_err(|_| CommandError::Usage(usage))
}
