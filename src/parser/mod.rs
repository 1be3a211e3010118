// Author: Dustin Pilgrim
// License: MIT

use crate::ast::{File, Pos, Range};
use crate::lexer::{Lexer, Spanned, Token};
use crate::HclError;

mod body;
mod expression;
mod template;

/// Parse raw source bytes into a syntax tree. HCL sources must be UTF-8.
pub fn parse_config(bytes: &[u8], filename: &str) -> Result<File, HclError> {
    let source = std::str::from_utf8(bytes).map_err(|e| HclError::SyntaxError {
        message: format!("{} is not valid UTF-8: {}", filename, e),
        line: 0,
        column: 0,
        hint: Some("HCL sources must be UTF-8 encoded".into()),
        code: Some(100),
    })?;

    let mut parser = Parser::new(source);
    parser.parse_file(filename)
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a str,
    peek: Option<Spanned>,
    /// One entry per open bracket; `true` while newlines are insignificant.
    newline_modes: Vec<bool>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            source: input,
            peek: None,
            newline_modes: vec![false],
        }
    }

    pub fn parse_file(&mut self, filename: &str) -> Result<File, HclError> {
        let body = body::parse_root_body(self)?;
        Ok(File {
            filename: filename.to_string(),
            source: self.source.to_string(),
            body,
        })
    }

    fn skipping_newlines(&self) -> bool {
        self.newline_modes.last().copied().unwrap_or(false)
    }

    fn fill(&mut self) -> Result<(), HclError> {
        loop {
            let spanned = match self.peek.take() {
                Some(s) => s,
                None => self.lexer.next_token()?,
            };
            if spanned.token == Token::Newline && self.skipping_newlines() {
                continue;
            }
            self.peek = Some(spanned);
            return Ok(());
        }
    }

    fn eof_error(&self) -> HclError {
        HclError::UnexpectedEof {
            message: "Unexpected end of input".into(),
            line: self.lexer.line(),
            column: self.lexer.column(),
            hint: None,
            code: Some(201),
        }
    }

    pub(crate) fn bump(&mut self) -> Result<Spanned, HclError> {
        self.fill()?;
        let curr = self.peek.take().ok_or_else(|| self.eof_error())?;
        Ok(curr)
    }

    pub(crate) fn peek(&mut self) -> Result<&Spanned, HclError> {
        self.fill()?;
        self.peek.as_ref().ok_or_else(|| self.eof_error())
    }

    pub(crate) fn peek_token(&mut self) -> Result<&Token, HclError> {
        Ok(&self.peek()?.token)
    }

    pub(crate) fn expect(&mut self, expected: Token, hint: &str) -> Result<Spanned, HclError> {
        let spanned = self.bump()?;
        if spanned.token != expected {
            return Err(self.unexpected(&spanned, hint, 202));
        }
        Ok(spanned)
    }

    pub(crate) fn expect_ident(&mut self, hint: &str) -> Result<(String, Range), HclError> {
        let spanned = self.bump()?;
        match spanned.token {
            Token::Ident(name) => Ok((name, spanned.range)),
            _ => Err(self.unexpected(&spanned, hint, 203)),
        }
    }

    /// Consume the keyword `word` (`in`, `if`, ...).
    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<Spanned, HclError> {
        let spanned = self.bump()?;
        match &spanned.token {
            Token::Ident(name) if name == word => Ok(spanned),
            _ => Err(self.unexpected(&spanned, &format!("Expected '{}'", word), 204)),
        }
    }

    pub(crate) fn at_keyword(&mut self, word: &str) -> Result<bool, HclError> {
        Ok(matches!(self.peek_token()?, Token::Ident(name) if name == word))
    }

    /// Run `f` with newlines made significant (`false`) or skipped (`true`),
    /// restoring the enclosing mode afterwards.
    pub(crate) fn nested<T>(
        &mut self,
        skip_newlines: bool,
        f: impl FnOnce(&mut Self) -> Result<T, HclError>,
    ) -> Result<T, HclError> {
        self.newline_modes.push(skip_newlines);
        let result = f(self);
        self.newline_modes.pop();
        result
    }

    pub(crate) fn unexpected(&self, spanned: &Spanned, hint: &str, code: u32) -> HclError {
        if spanned.token == Token::Eof {
            return HclError::UnexpectedEof {
                message: hint.to_string(),
                line: spanned.range.start.line,
                column: spanned.range.start.column,
                hint: None,
                code: Some(201),
            };
        }
        HclError::InvalidToken {
            token: format!("{:?}", spanned.token),
            line: spanned.range.start.line,
            column: spanned.range.start.column,
            hint: Some(hint.to_string()),
            code: Some(code),
        }
    }

    pub(crate) fn syntax_error(&self, range: &Range, message: String, hint: Option<String>, code: u32) -> HclError {
        HclError::SyntaxError {
            message,
            line: range.start.line,
            column: range.start.column,
            hint,
            code: Some(code),
        }
    }
}

#[cfg(test)]
mod tests;
