//! Split pattern text into literal runs and placeholders.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::errors::PatternError;

use super::placeholder::{Placeholder, read_placeholder};

pub(crate) type PatternChars<'a> = Peekable<CharIndices<'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Placeholder(Placeholder),
}

pub(crate) fn lex_pattern(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars: PatternChars<'_> = pattern.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\\' => literal.push(chars.next().map_or('\\', |(_, escaped)| escaped)),
            '{' | '}' => {
                if chars.next_if(|&(_, next)| next == ch).is_some() {
                    literal.push(ch);
                    continue;
                }
                if ch == '}' {
                    return Err(PatternError::StrayBrace { brace: ch, offset });
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Placeholder(read_placeholder(&mut chars, offset)?));
            }
            other => literal.push(other),
        }
    }

    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}
