//! Block-structured `pfx` directive, as written in server config files.
//!
//! ```text
//! pfx /etc/ssl/site.pfx "pass phrase"
//!
//! pfx {
//!     path /etc/ssl/site.pfx
//!     password "pass phrase"
//!     fetch_full_chain false
//! }
//! ```

use pfxchain_core::{ChainError, Result};

use crate::config::PfxConfig;

/// Directive keyword
pub const DIRECTIVE: &str = "pfx";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    line: usize,
    quoted: bool,
}

impl Token {
    fn is(&self, s: &str) -> bool {
        !self.quoted && self.text == s
    }
}

fn config_err(line: usize, msg: impl std::fmt::Display) -> ChainError {
    ChainError::Config(format!("line {line}: {msg}"))
}

/// Split into whitespace-separated tokens. Double quotes group words and
/// accept `\"` and `\\` escapes; `#` starts a comment at a token boundary.
fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c == '\n' {
            line += 1;
            chars.next();
        } else if c.is_whitespace() {
            chars.next();
        } else if c == '#' {
            while chars.peek().is_some_and(|&c| c != '\n') {
                chars.next();
            }
        } else if c == '"' {
            let start = line;
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped @ ('"' | '\\')) => text.push(escaped),
                        Some(other) => {
                            text.push('\\');
                            text.push(other);
                        }
                        None => return Err(config_err(start, "unterminated quoted string")),
                    },
                    Some(ch) => {
                        if ch == '\n' {
                            line += 1;
                        }
                        text.push(ch);
                    }
                    None => return Err(config_err(start, "unterminated quoted string")),
                }
            }
            tokens.push(Token {
                text,
                line: start,
                quoted: true,
            });
        } else {
            let mut text = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '"' {
                    break;
                }
                text.push(ch);
                chars.next();
            }
            tokens.push(Token {
                text,
                line,
                quoted: false,
            });
        }
    }

    Ok(tokens)
}

/// Parse a single `pfx` directive into a validated [`PfxConfig`].
pub fn parse_directive(input: &str) -> Result<PfxConfig> {
    let tokens = tokenize(input)?;
    let mut iter = tokens.into_iter().peekable();

    let head = iter
        .next()
        .ok_or_else(|| ChainError::Config("empty directive".into()))?;
    if !head.is(DIRECTIVE) {
        return Err(config_err(
            head.line,
            format!("expected `{DIRECTIVE}`, found `{}`", head.text),
        ));
    }

    let mut config = PfxConfig::default();

    if iter.peek().is_some_and(|t| t.is("{") && t.line == head.line) {
        iter.next();
        parse_block(&mut iter, &mut config)?;
    } else {
        let args: Vec<Token> = std::iter::from_fn(|| iter.next_if(|t| t.line == head.line)).collect();
        match args.as_slice() {
            [path] => config.path = path.text.clone().into(),
            [path, password] => {
                config.path = path.text.clone().into();
                config.password.clone_from(&password.text);
            }
            _ => return Err(config_err(head.line, "wrong argument count")),
        }
    }

    if let Some(extra) = iter.next() {
        return Err(config_err(extra.line, format!("unexpected `{}`", extra.text)));
    }

    config.validate()?;
    Ok(config)
}

fn parse_block<I>(iter: &mut std::iter::Peekable<I>, config: &mut PfxConfig) -> Result<()>
where
    I: Iterator<Item = Token>,
{
    loop {
        let key = iter
            .next()
            .ok_or_else(|| ChainError::Config("unclosed block: missing `}`".into()))?;
        if key.is("}") {
            return Ok(());
        }

        let args: Vec<Token> =
            std::iter::from_fn(|| iter.next_if(|t| t.line == key.line && !t.is("}"))).collect();
        let [value] = args.as_slice() else {
            return Err(config_err(key.line, format!("`{}` takes exactly one argument", key.text)));
        };

        match key.text.as_str() {
            "path" => config.path = value.text.clone().into(),
            "password" => config.password.clone_from(&value.text),
            "fetch_full_chain" => {
                config.fetch_full_chain = Some(match value.text.as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(config_err(
                            value.line,
                            format!("{other} is not a valid value for fetch_full_chain"),
                        ))
                    }
                });
            }
            "cache_dir" => config.cache_dir = Some(value.text.clone().into()),
            other => return Err(config_err(key.line, format!("{other} not allowed here"))),
        }
    }
}
