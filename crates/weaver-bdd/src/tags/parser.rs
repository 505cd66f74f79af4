//! Recursive-descent parser producing the tag expression tree.

use super::lexer::{Lexer, Token, TokenKind};
use super::{Expr, TagExprError};

pub(super) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Result<Self, TagExprError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub(super) fn parse_complete(mut self) -> Result<Expr, TagExprError> {
        let expr = self.parse_or()?;
        if self.current.kind == TokenKind::End {
            Ok(expr)
        } else {
            Err(TagExprError::new(
                self.current.offset,
                format!("unexpected token {}", self.current.describe()),
            ))
        }
    }

    fn advance(&mut self) -> Result<(), TagExprError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, TagExprError> {
        let mut lhs = self.parse_and()?;
        while self.current.kind == TokenKind::Or {
            self.advance()?;
            self.ensure_operand("or")?;
            lhs = Expr::Or(Box::new(lhs), Box::new(self.parse_and()?));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, TagExprError> {
        let mut lhs = self.parse_not()?;
        while self.current.kind == TokenKind::And {
            self.advance()?;
            self.ensure_operand("and")?;
            lhs = Expr::And(Box::new(lhs), Box::new(self.parse_not()?));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, TagExprError> {
        if self.current.kind == TokenKind::Not {
            self.advance()?;
            self.ensure_operand("not")?;
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, TagExprError> {
        let token = self.current.clone();
        match token.kind {
            TokenKind::Tag(tag) => {
                self.advance()?;
                Ok(Expr::Tag(tag))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_or()?;
                if self.current.kind != TokenKind::RParen {
                    return Err(TagExprError::new(token.offset, "missing ')'"));
                }
                self.advance()?;
                Ok(inner)
            }
            TokenKind::End => Err(TagExprError::new(token.offset, "expected tag or '('")),
            _ => Err(TagExprError::new(
                token.offset,
                format!("expected tag or '(' but found {}", token.describe()),
            )),
        }
    }

    fn ensure_operand(&self, operator: &str) -> Result<(), TagExprError> {
        match self.current.kind {
            TokenKind::And | TokenKind::Or | TokenKind::RParen | TokenKind::End => {
                Err(TagExprError::new(
                    self.current.offset,
                    format!("expected tag or '(' after '{operator}'"),
                ))
            }
            _ => Ok(()),
        }
    }
}
