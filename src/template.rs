//! Template argument tokenizer.
//!
//! Splits a template-bearing name into its untemplated prefix and a nested
//! argument-token tree, and recomposes the two. The external parser reports
//! template names with canonical spacing (`foo< int, 66 >`), which is exactly
//! what [`join`] produces, so `join(tokenize(n)) == n` for any name in that
//! form. On ingestion, interior runs of whitespace (including tabs) collapse
//! to a single ASCII space; punctuation adjacency (`*`, `&`, `...`) is left
//! untouched.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::GenerationError;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"[ \t\r\n]+").unwrap();
}

/// One element of a template token tree.
///
/// A tokenized name is a `Vec<Token>` whose first element is the untemplated
/// prefix. A `Group` directly under the top level is an argument list; a
/// `Group` inside an argument list is a nested template (a full token tree of
/// its own). A `Text` after a group is a trailing plain segment such as
/// `::Data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Group(Vec<Token>),
}

impl Token {
    pub fn text(value: impl Into<String>) -> Token {
        Token::Text(value.into())
    }

    pub fn group(items: Vec<Token>) -> Token {
        Token::Group(items)
    }
}

/// Collapse every run of whitespace to a single ASCII space.
pub fn normalize_whitespace(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name, " ").into_owned()
}

/// Tokenize `name` into a template token tree.
///
/// The empty string yields an empty tree; a name without angle brackets
/// yields a single-element tree containing the name unchanged. Unmatched
/// brackets are a fatal [`GenerationError::Tokenize`] naming the offending
/// segment; the tokenizer never silently truncates.
pub fn tokenize(name: &str) -> Result<Vec<Token>, GenerationError> {
    if name.is_empty() {
        return Ok(Vec::new());
    }
    let normalized = normalize_whitespace(name);
    check_balance(name, &normalized)?;
    Ok(tokenize_balanced(&normalized))
}

fn check_balance(original: &str, normalized: &str) -> Result<(), GenerationError> {
    let mut open_positions: Vec<usize> = Vec::new();
    for (pos, c) in normalized.char_indices() {
        match c {
            '<' => open_positions.push(pos),
            '>' => {
                if open_positions.pop().is_none() {
                    return Err(GenerationError::Tokenize {
                        name: original.to_string(),
                        reason: "'>' without a matching '<'".to_string(),
                        offending: normalized[pos..].to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    if let Some(pos) = open_positions.first() {
        return Err(GenerationError::Tokenize {
            name: original.to_string(),
            reason: "'<' without a matching '>'".to_string(),
            offending: normalized[*pos..].to_string(),
        });
    }
    Ok(())
}

/// Core scan; `name` is already normalized and bracket-balanced.
fn tokenize_balanced(name: &str) -> Vec<Token> {
    let open = match name.find('<') {
        Some(pos) => pos,
        None => return vec![Token::Text(name.to_string())],
    };

    let mut tokens = vec![Token::Text(name[..open].to_string())];
    let mut args: Vec<Token> = Vec::new();
    let mut depth = 0usize;
    let mut arg_start = open + 1;
    let mut close = name.len();

    for (offset, c) in name[open..].char_indices() {
        let pos = open + offset;
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    push_arg(&mut args, &name[arg_start..pos]);
                    close = pos;
                    break;
                }
            }
            ',' if depth == 1 => {
                push_arg(&mut args, &name[arg_start..pos]);
                arg_start = pos + 1;
            }
            _ => {}
        }
    }

    tokens.push(Token::Group(args));

    // Anything after the final top-level '>' (e.g. `::Data`) is a plain
    // trailing segment, not part of the argument list.
    let suffix = &name[close + 1..];
    if !suffix.is_empty() {
        tokens.push(Token::Text(suffix.to_string()));
    }
    tokens
}

fn push_arg(args: &mut Vec<Token>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    if trimmed.contains('<') {
        args.push(Token::Group(tokenize_balanced(trimmed)));
    } else {
        args.push(Token::Text(trimmed.to_string()));
    }
}

/// Recompose a token tree produced by [`tokenize`].
///
/// The strict inverse of tokenization: an empty tree yields the empty string;
/// a tree whose first element is not a string is rejected with
/// [`GenerationError::InvalidTokenTree`]. Argument lists render as
/// `prefix< arg1, arg2 >` with exactly one space after `<` and before `>`;
/// trailing plain segments concatenate without a separator.
pub fn join(tokens: &[Token]) -> Result<String, GenerationError> {
    if tokens.is_empty() {
        return Ok(String::new());
    }
    let prefix = match &tokens[0] {
        Token::Text(text) => text,
        Token::Group(_) => return Err(GenerationError::InvalidTokenTree),
    };

    let mut out = prefix.clone();
    for token in &tokens[1..] {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Group(args) => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        Token::Text(text) => rendered.push(text.clone()),
                        Token::Group(sub) => rendered.push(join(sub)?),
                    }
                }
                out.push_str("< ");
                out.push_str(&rendered.join(", "));
                out.push_str(" >");
            }
        }
    }
    Ok(out)
}

/// Local display name of a possibly-specialized template.
///
/// Starting from the end of the tree, takes the last plain segment's final
/// `::` component and re-joins it with any template groups that follow it,
/// so `ns::Foo< T >` displays as `Foo< T >` and `ns::Foo< T >::Bar` as
/// `Bar`. Returns `None` for an empty tree.
pub fn display_name(tokens: &[Token]) -> Option<String> {
    let mut trailing: Vec<Token> = Vec::new();
    for token in tokens.iter().rev() {
        match token {
            Token::Group(_) => trailing.insert(0, token.clone()),
            Token::Text(text) => {
                let local = text.rsplit("::").next().unwrap_or(text);
                let mut tree = vec![Token::Text(local.to_string())];
                tree.append(&mut trailing);
                return join(&tree).ok();
            }
        }
    }
    None
}
