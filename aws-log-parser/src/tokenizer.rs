//! Line tokenizer
//!
//! Splits one raw log line into positional fields. CloudFront lines are split
//! on single tabs with no quoting. Load balancer lines are split on runs of
//! whitespace, with double-quoted segments kept whole.

use crate::error::TokenizeError;
use serde::{Deserialize, Serialize};

/// Field delimiter convention of a log type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Every `\t` separates two fields; quotes are literal
    Tab,
    /// Runs of whitespace separate fields; `"..."` groups a field
    Whitespace,
}

/// Split a line into raw field strings
pub fn tokenize(line: &str, delimiter: Delimiter) -> Result<Vec<String>, TokenizeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    match delimiter {
        Delimiter::Tab => Ok(line.split('\t').map(str::to_string).collect()),
        Delimiter::Whitespace => tokenize_quoted(line),
    }
}

fn tokenize_quoted(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A token can be empty ("") so presence is tracked separately from content
    let mut in_token = false;
    let mut quote_start: Option<usize> = None;
    let mut chars = line.char_indices();

    while let Some((pos, c)) = chars.next() {
        if quote_start.is_some() {
            match c {
                '"' => quote_start = None,
                '\\' => match chars.clone().next() {
                    Some((_, next @ ('"' | '\\'))) => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                },
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                quote_start = Some(pos);
                in_token = true;
            }
            c if c.is_ascii_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(column) = quote_start {
        return Err(TokenizeError::UnterminatedQuote { column });
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}
