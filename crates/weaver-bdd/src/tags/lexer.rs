//! Tokeniser for tag expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use super::TagExprError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// Tag name without the leading `@`.
    Tag(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
    End,
}

#[derive(Clone, Debug)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) offset: usize,
}

impl Token {
    pub(super) fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Tag(tag) => format!("@{tag}"),
            TokenKind::And => "'and'".into(),
            TokenKind::Or => "'or'".into(),
            TokenKind::Not => "'not'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::End => "end of input".into(),
        }
    }
}

pub(super) struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Lexer<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            len: input.len(),
        }
    }

    pub(super) fn next_token(&mut self) -> Result<Token, TagExprError> {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let Some((offset, ch)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::End,
                offset: self.len,
            });
        };
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '@' => {
                let name = self.take_while(is_tag_char);
                if name.is_empty() {
                    return Err(TagExprError::new(offset + 1, "expected tag name after '@'"));
                }
                TokenKind::Tag(name)
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = c.to_string();
                word.push_str(&self.take_while(|ch| ch.is_ascii_alphabetic()));
                match word.to_ascii_lowercase().as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    _ => {
                        return Err(TagExprError::new(
                            offset,
                            format!("unexpected identifier '{word}'"),
                        ));
                    }
                }
            }
            other => {
                return Err(TagExprError::new(
                    offset,
                    format!("unexpected character '{other}'"),
                ));
            }
        };
        Ok(Token { kind, offset })
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some((_, ch)) = self.chars.next_if(|&(_, ch)| accept(ch)) {
            out.push(ch);
        }
        out
    }
}

fn is_tag_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-')
}
