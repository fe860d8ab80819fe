//! Command tokens
//!
//! One token is one player action. Skills of the three frontline servants
//! are `a` to `i` (three per servant), mystic code skills `j` `k` `l`,
//! swaps `x`, NPs `4` `5` `6`, and `#` ends the turn. Skill tokens take an
//! optional target digit and an optional `[ChNX]` choice, either bare
//! (`a2`, `a[Ch2A]`) or grouped (`a([Ch2A]3)`).

use std::fmt;

use crate::engine::Choice;

/// A parsed token. All indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Skill {
        servant: usize,
        skill: usize,
        target: Option<usize>,
        choice: Option<Choice>,
    },
    MysticCode {
        slot: usize,
        target: Option<usize>,
        choice: Option<Choice>,
    },
    Swap { frontline: usize, bench: usize },
    /// `x` without positions
    SwapDefault,
    NoblePhantasm { servant: usize },
    EndTurn,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Empty token")]
    Empty,
    #[error("Unknown token: {0}")]
    Unknown(String),
    #[error("Bad target in token {0}")]
    BadTarget(String),
    #[error("Bad choice in token {0}")]
    BadChoice(String),
}

/// Split a script into tokens
pub fn tokenize(script: &str) -> Vec<&str> {
    script.split_whitespace().collect()
}

/// Target digit 1-3 to a 0-based index
fn position(c: char) -> Option<usize> {
    match c {
        '1'..='3' => Some(c as usize - '1' as usize),
        _ => None,
    }
}

/// `[ChNX]`: N options, pick letter X
fn parse_choice(text: &str, token: &str) -> Result<Choice, TokenError> {
    let bad = || TokenError::BadChoice(token.to_string());
    let inner = text
        .strip_prefix("[Ch")
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(bad)?;
    let mut chars = inner.chars();
    let (Some(num), Some(letter), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(bad());
    };
    let num = num.to_digit(10).ok_or_else(bad)? as usize;
    if !letter.is_ascii_uppercase() {
        return Err(bad());
    }
    Ok(Choice::new(num, letter as usize - 'A' as usize))
}

/// Optional choice and target following a skill letter
fn parse_suffix(rest: &str, token: &str) -> Result<(Option<usize>, Option<Choice>), TokenError> {
    let rest = match rest.strip_prefix('(') {
        Some(inner) => inner
            .strip_suffix(')')
            .ok_or_else(|| TokenError::Unknown(token.to_string()))?,
        None => rest,
    };

    let (choice, rest) = if rest.starts_with('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| TokenError::BadChoice(token.to_string()))?;
        (Some(parse_choice(&rest[..=end], token)?), &rest[end + 1..])
    } else {
        (None, rest)
    };

    let mut chars = rest.chars();
    let target = match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(c), None) => {
            Some(position(c).ok_or_else(|| TokenError::BadTarget(token.to_string()))?)
        }
        _ => return Err(TokenError::BadTarget(token.to_string())),
    };
    Ok((target, choice))
}

impl Command {
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        let token = token.trim();
        let mut chars = token.chars();
        let Some(head) = chars.next() else {
            return Err(TokenError::Empty);
        };
        let rest = chars.as_str();

        match head {
            'a'..='i' => {
                let idx = head as usize - 'a' as usize;
                let (target, choice) = parse_suffix(rest, token)?;
                Ok(Command::Skill {
                    servant: idx / 3,
                    skill: idx % 3,
                    target,
                    choice,
                })
            }
            'j'..='l' => {
                let (target, choice) = parse_suffix(rest, token)?;
                Ok(Command::MysticCode {
                    slot: head as usize - 'j' as usize,
                    target,
                    choice,
                })
            }
            'x' => {
                let mut digits = rest.chars();
                match (digits.next(), digits.next(), digits.next()) {
                    (None, _, _) => Ok(Command::SwapDefault),
                    (Some(f), Some(b), None) => match (position(f), position(b)) {
                        (Some(frontline), Some(bench)) => Ok(Command::Swap { frontline, bench }),
                        _ => Err(TokenError::BadTarget(token.to_string())),
                    },
                    _ => Err(TokenError::BadTarget(token.to_string())),
                }
            }
            '4'..='6' if rest.is_empty() => Ok(Command::NoblePhantasm {
                servant: head as usize - '4' as usize,
            }),
            '#' if rest.is_empty() => Ok(Command::EndTurn),
            _ => Err(TokenError::Unknown(token.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = |target: &Option<usize>, choice: &Option<Choice>| {
            let choice = choice
                .map(|c| format!("[Ch{}{}]", c.num, (b'A' + c.index as u8) as char))
                .unwrap_or_default();
            let target = target.map(|t| (t + 1).to_string()).unwrap_or_default();
            if !choice.is_empty() && !target.is_empty() {
                format!("({}{})", choice, target)
            } else {
                format!("{}{}", choice, target)
            }
        };
        match self {
            Command::Skill {
                servant,
                skill,
                target,
                choice,
            } => {
                let letter = (b'a' + (servant * 3 + skill) as u8) as char;
                write!(f, "{}{}", letter, suffix(target, choice))
            }
            Command::MysticCode {
                slot,
                target,
                choice,
            } => {
                let letter = (b'j' + *slot as u8) as char;
                write!(f, "{}{}", letter, suffix(target, choice))
            }
            Command::Swap { frontline, bench } => write!(f, "x{}{}", frontline + 1, bench + 1),
            Command::SwapDefault => write!(f, "x"),
            Command::NoblePhantasm { servant } => write!(f, "{}", servant + 4),
            Command::EndTurn => write!(f, "#"),
        }
    }
}
