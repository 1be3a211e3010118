// Author: Dustin Pilgrim
// License: MIT

use crate::ast::{Number, Pos, Range};
use crate::HclError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- literals ---
    Ident(String),
    Number(Number),

    // --- structure ---
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    Ellipsis,
    Question,
    Colon,
    Equals,
    FatArrow,

    // --- operators ---
    EqualEqual,
    NotEqual,
    Bang,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    And,
    Or,

    // --- templates ---
    OQuote,
    CQuote,
    OHeredoc { marker: String, flush: bool },
    CHeredoc,
    TemplateLiteral(String),
    /// `${`, or `${~` when `strip` is set.
    TemplateInterp { strip: bool },
    /// `%{`, or `%{~` when `strip` is set.
    TemplateControl { strip: bool },
    /// The `}` closing an interpolation or directive, or `~}`.
    TemplateSeqEnd { strip: bool },

    // --- layout ---
    Newline,
    Eof,
}

/// A token with the source range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub range: Range,
}

/// What the lexer is currently inside of. Decides how the next character
/// is read: as expression syntax or as template text.
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    Brace,
    Interp,
    Quoted,
    Heredoc { marker: String },
}

pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    modes: Vec<Mode>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            offset: 0,
            line: 1,
            column: 1,
            modes: vec![Mode::Normal],
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
            byte: self.offset,
        }
    }

    /// Read the next token. Template text or expression syntax is chosen
    /// from the current mode.
    pub fn next_token(&mut self) -> Result<Spanned, HclError> {
        tokenizer::next_token(self)
    }

    /// Read every remaining token, up to and including `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, HclError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[cfg(test)]
mod tests;
