use super::*;

/// Advance one character and update line/column tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = peek_char(lexer)?;
    lexer.offset += curr.len_utf8();
    if curr == '\n' {
        lexer.line += 1;
        lexer.column = 1;
    } else {
        lexer.column += 1;
    }
    Some(curr)
}

/// Advance `n` characters
pub(super) fn bump_n(lexer: &mut Lexer, n: usize) {
    for _ in 0..n {
        bump(lexer);
    }
}

/// Peek at the current character without consuming it
pub(super) fn peek_char(lexer: &Lexer) -> Option<char> {
    rest(lexer).chars().next()
}

/// Peek `n` characters past the current one
pub(super) fn peek_nth(lexer: &Lexer, n: usize) -> Option<char> {
    rest(lexer).chars().nth(n)
}

/// The unread part of the input
pub(super) fn rest<'a>(lexer: &Lexer<'a>) -> &'a str {
    &lexer.input[lexer.offset..]
}

pub(super) fn at_line_start(lexer: &Lexer) -> bool {
    lexer.offset == 0 || lexer.input.as_bytes()[lexer.offset - 1] == b'\n'
}

/// Skip spaces and comments. Newlines are left in place because they
/// separate body items.
pub(super) fn skip_whitespace_and_comments(lexer: &mut Lexer) -> Result<(), HclError> {
    while let Some(c) = peek_char(lexer) {
        match c {
            ' ' | '\t' => {
                bump(lexer);
            }
            '\r' if peek_nth(lexer, 1) == Some('\n') => {
                bump(lexer);
            }
            '#' => skip_line_comment(lexer),
            '/' if peek_nth(lexer, 1) == Some('/') => skip_line_comment(lexer),
            '/' if peek_nth(lexer, 1) == Some('*') => skip_block_comment(lexer)?,
            _ => break,
        }
    }
    Ok(())
}

fn skip_line_comment(lexer: &mut Lexer) {
    while let Some(ch) = peek_char(lexer) {
        if ch == '\n' {
            break;
        }
        bump(lexer);
    }
}

fn skip_block_comment(lexer: &mut Lexer) -> Result<(), HclError> {
    let (line, column) = (lexer.line, lexer.column);
    bump_n(lexer, 2);
    loop {
        match bump(lexer) {
            Some('*') if peek_char(lexer) == Some('/') => {
                bump(lexer);
                return Ok(());
            }
            Some(_) => {}
            None => {
                return Err(HclError::UnexpectedEof {
                    message: "Unterminated block comment".into(),
                    line,
                    column,
                    hint: Some("Close the comment with */".into()),
                    code: Some(106),
                });
            }
        }
    }
}
