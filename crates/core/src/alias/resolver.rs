//! Alias resolution
//!
//! An alias expands to a command string. When the first word of that string is
//! itself an alias it is expanded again; the remaining words are carried along.
//! Only the leading word participates in the chain, so an alias whose target
//! merely mentions another alias name further along is not a cycle.

use super::Alias;
use crate::error::{Error, Result};

fn lookup<'a>(aliases: &'a [Alias], name: &str) -> Option<&'a str> {
    aliases
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.command.as_str())
}

/// Split a command string into its first word and the untouched remainder
///
/// The first word ends at the first whitespace outside quotes and is unquoted
/// the same way [`split_command`] does it; the remainder keeps its quoting.
fn split_head(command: &str) -> Result<(String, &str)> {
    let command = command.trim();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = command.len();

    for (pos, c) in command.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => escaped = true,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, c) if c.is_whitespace() => {
                end = pos;
                break;
            }
            _ => {}
        }
    }

    let head = split_command(&command[..end])?
        .into_iter()
        .next()
        .unwrap_or_default();
    Ok((head, command[end..].trim_start()))
}

/// Resolve a token against an alias list
///
/// Returns the token unchanged when it is not an alias. Substitution stops at
/// the first leading word that is not an alias. A name seen twice in one chain
/// is a cycle; the chain length is also capped at the number of aliases.
pub fn resolve(aliases: &[Alias], token: &str) -> Result<String> {
    let Some(target) = lookup(aliases, token) else {
        return Ok(token.to_string());
    };

    let max_hops = aliases.len();
    let mut visited = vec![token.to_string()];
    let mut expansion = target.trim().to_string();

    loop {
        let (head, rest) = split_head(&expansion)?;
        let Some(next) = lookup(aliases, &head) else {
            break;
        };

        if visited.contains(&head) || visited.len() >= max_hops {
            let mut path = visited;
            path.push(head);
            return Err(Error::AliasCycle { path });
        }

        expansion = if rest.is_empty() {
            next.trim().to_string()
        } else {
            format!("{} {rest}", next.trim())
        };
        visited.push(head);
    }

    tracing::debug!(alias = token, chain = ?visited, resolved = %expansion, "resolved alias");
    Ok(expansion)
}

/// Verify that none of `names` starts a cyclic chain in `aliases`
pub fn check_acyclic<'a>(aliases: &[Alias], names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for name in names {
        resolve(aliases, name)?;
    }
    Ok(())
}

/// Split a command string into words
///
/// Words are separated by whitespace; single or double quotes group words and
/// a backslash escapes the next character outside single quotes.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                    in_word = true;
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(Error::Config(format!(
            "Unterminated {q} quote in command: {command}"
        )));
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
