use once_cell::sync::Lazy;
use regex::Regex;

use super::*;
use super::scanner::{at_line_start, bump, bump_n, peek_char, peek_nth, rest, skip_whitespace_and_comments};

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?").expect("number pattern is valid")
});

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Spanned, HclError> {
    match lexer.modes.last() {
        Some(Mode::Quoted) => tokenize_quoted(lexer),
        Some(Mode::Heredoc { marker }) => {
            let marker = marker.clone();
            tokenize_heredoc(lexer, &marker)
        }
        _ => tokenize_expression(lexer),
    }
}

fn spanned(lexer: &Lexer, token: Token, start: Pos) -> Result<Spanned, HclError> {
    Ok(Spanned {
        token,
        range: Range::new(start, lexer.pos()),
    })
}

fn tokenize_expression(lexer: &mut Lexer) -> Result<Spanned, HclError> {
    skip_whitespace_and_comments(lexer)?;
    let start = lexer.pos();

    let Some(ch) = peek_char(lexer) else {
        return spanned(lexer, Token::Eof, start);
    };
    let next = peek_nth(lexer, 1);

    let token = match (ch, next) {
        ('\n', _) => single(lexer, Token::Newline),
        ('{', _) => {
            bump(lexer);
            lexer.modes.push(Mode::Brace);
            Token::LBrace
        }
        ('}', _) => {
            bump(lexer);
            close_brace(lexer)
        }
        ('~', Some('}')) if lexer.modes.last() == Some(&Mode::Interp) => {
            bump_n(lexer, 2);
            lexer.modes.pop();
            Token::TemplateSeqEnd { strip: true }
        }
        ('"', _) => {
            bump(lexer);
            lexer.modes.push(Mode::Quoted);
            Token::OQuote
        }
        ('<', Some('<')) => return tokenize_heredoc_open(lexer, start),
        ('[', _) => single(lexer, Token::LBracket),
        (']', _) => single(lexer, Token::RBracket),
        ('(', _) => single(lexer, Token::LParen),
        (')', _) => single(lexer, Token::RParen),
        (',', _) => single(lexer, Token::Comma),
        ('.', _) if rest(lexer).starts_with("...") => {
            bump_n(lexer, 3);
            Token::Ellipsis
        }
        ('.', _) => single(lexer, Token::Dot),
        ('?', _) => single(lexer, Token::Question),
        (':', _) => single(lexer, Token::Colon),
        ('=', Some('=')) => double(lexer, Token::EqualEqual),
        ('=', Some('>')) => double(lexer, Token::FatArrow),
        ('=', _) => single(lexer, Token::Equals),
        ('!', Some('=')) => double(lexer, Token::NotEqual),
        ('!', _) => single(lexer, Token::Bang),
        ('<', Some('=')) => double(lexer, Token::LessEqual),
        ('<', _) => single(lexer, Token::Less),
        ('>', Some('=')) => double(lexer, Token::GreaterEqual),
        ('>', _) => single(lexer, Token::Greater),
        ('&', Some('&')) => double(lexer, Token::And),
        ('|', Some('|')) => double(lexer, Token::Or),
        ('+', _) => single(lexer, Token::Plus),
        ('-', _) => single(lexer, Token::Minus),
        ('*', _) => single(lexer, Token::Star),
        ('/', _) => single(lexer, Token::Slash),
        ('%', _) => single(lexer, Token::Percent),
        (c, _) if c.is_ascii_digit() => tokenize_number(lexer)?,
        (c, _) if c.is_alphabetic() || c == '_' => tokenize_identifier(lexer),
        (c, _) => return tokenize_unexpected_char(lexer, c),
    };

    spanned(lexer, token, start)
}

fn single(lexer: &mut Lexer, token: Token) -> Token {
    bump(lexer);
    token
}

fn double(lexer: &mut Lexer, token: Token) -> Token {
    bump_n(lexer, 2);
    token
}

/// A `}` ends whatever the innermost open brace started.
fn close_brace(lexer: &mut Lexer) -> Token {
    match lexer.modes.last() {
        Some(Mode::Interp) => {
            lexer.modes.pop();
            Token::TemplateSeqEnd { strip: false }
        }
        Some(Mode::Brace) => {
            lexer.modes.pop();
            Token::RBrace
        }
        _ => Token::RBrace,
    }
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, HclError> {
    let text = NUMBER
        .find(rest(lexer))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let (line, column) = (lexer.line, lexer.column);
    bump_n(lexer, text.chars().count());

    Number::parse(&text)
        .map(Token::Number)
        .ok_or_else(|| HclError::InvalidToken {
            token: text.clone(),
            line,
            column,
            hint: Some("Invalid number literal, or its exponent is out of range".into()),
            code: Some(102),
        })
}

fn tokenize_identifier(lexer: &mut Lexer) -> Token {
    let mut ident = String::new();

    while let Some(ch) = peek_char(lexer) {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            ident.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    Token::Ident(ident)
}

fn tokenize_unexpected_char(lexer: &mut Lexer, ch: char) -> Result<Spanned, HclError> {
    let (line, column) = (lexer.line, lexer.column);
    bump(lexer);
    Err(HclError::UnexpectedCharacter {
        character: ch,
        line,
        column,
        hint: Some("Unexpected character in input".into()),
        code: Some(104),
    })
}

/// `${` / `%{` inside a template, with an optional `~` strip marker.
fn open_sequence(lexer: &mut Lexer, control: bool) -> Token {
    bump_n(lexer, 2);
    let strip = peek_char(lexer) == Some('~');
    if strip {
        bump(lexer);
    }
    lexer.modes.push(Mode::Interp);
    if control {
        Token::TemplateControl { strip }
    } else {
        Token::TemplateInterp { strip }
    }
}

/// Template escapes shared by quoted strings and heredocs: `$${` and `%%{`
/// stand for a literal `${` and `%{`.
fn take_template_escape(lexer: &mut Lexer, content: &mut String) -> bool {
    let r = rest(lexer);
    if r.starts_with("$${") {
        content.push_str("${");
    } else if r.starts_with("%%{") {
        content.push_str("%{");
    } else {
        return false;
    }
    bump_n(lexer, 3);
    true
}

fn tokenize_quoted(lexer: &mut Lexer) -> Result<Spanned, HclError> {
    let start = lexer.pos();
    let r = rest(lexer);

    if r.starts_with('"') {
        bump(lexer);
        lexer.modes.pop();
        return spanned(lexer, Token::CQuote, start);
    }
    if r.starts_with("${") {
        let token = open_sequence(lexer, false);
        return spanned(lexer, token, start);
    }
    if r.starts_with("%{") {
        let token = open_sequence(lexer, true);
        return spanned(lexer, token, start);
    }

    let mut content = String::new();
    loop {
        if take_template_escape(lexer, &mut content) {
            continue;
        }
        let r = rest(lexer);
        if r.is_empty() || r.starts_with('\n') || r.starts_with("\r\n") {
            return Err(HclError::UnclosedString {
                quote: '"',
                line: start.line,
                column: start.column,
                hint: Some("String literal not closed before end of line".into()),
                code: Some(103),
            });
        }
        if r.starts_with('"') || r.starts_with("${") || r.starts_with("%{") {
            break;
        }
        if r.starts_with('\\') {
            bump(lexer);
            content.push(read_escape(lexer)?);
            continue;
        }
        if let Some(ch) = bump(lexer) {
            content.push(ch);
        }
    }

    spanned(lexer, Token::TemplateLiteral(content), start)
}

fn read_escape(lexer: &mut Lexer) -> Result<char, HclError> {
    let (line, column) = (lexer.line, lexer.column);
    let escaped = match bump(lexer) {
        Some('n') => '\n',
        Some('t') => '\t',
        Some('r') => '\r',
        Some('"') => '"',
        Some('\\') => '\\',
        Some('u') => return read_unicode_escape(lexer, 4, line, column),
        Some('U') => return read_unicode_escape(lexer, 8, line, column),
        Some(other) => {
            return Err(HclError::InvalidToken {
                token: format!("\\{}", other),
                line,
                column,
                hint: Some("Invalid escape sequence".into()),
                code: Some(105),
            });
        }
        None => {
            return Err(HclError::UnclosedString {
                quote: '"',
                line,
                column,
                hint: Some("Trailing backslash in string".into()),
                code: Some(103),
            });
        }
    };
    Ok(escaped)
}

fn read_unicode_escape(
    lexer: &mut Lexer,
    digits: usize,
    line: usize,
    column: usize,
) -> Result<char, HclError> {
    let hex: String = rest(lexer).chars().take(digits).collect();
    let invalid = || HclError::InvalidToken {
        token: format!("\\{}{}", if digits == 4 { 'u' } else { 'U' }, hex),
        line,
        column,
        hint: Some(format!("Expected {} hex digits naming a Unicode character", digits)),
        code: Some(105),
    };

    if hex.chars().count() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    bump_n(lexer, digits);

    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(invalid)
}

fn tokenize_heredoc_open(lexer: &mut Lexer, start: Pos) -> Result<Spanned, HclError> {
    bump_n(lexer, 2); // consume '<<'
    let flush = peek_char(lexer) == Some('-');
    if flush {
        bump(lexer);
    }

    let mut marker = String::new();
    while let Some(ch) = peek_char(lexer) {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            marker.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    if marker.is_empty() {
        return Err(HclError::SyntaxError {
            message: "Expected heredoc marker after <<".into(),
            line: start.line,
            column: start.column,
            hint: Some("Heredocs start like <<EOF".into()),
            code: Some(107),
        });
    }

    let r = rest(lexer);
    if r.starts_with("\r\n") {
        bump_n(lexer, 2);
    } else if r.starts_with('\n') {
        bump(lexer);
    } else {
        return Err(HclError::SyntaxError {
            message: format!("Heredoc marker {} must be followed by a newline", marker),
            line: lexer.line,
            column: lexer.column,
            hint: None,
            code: Some(107),
        });
    }

    lexer.modes.push(Mode::Heredoc { marker: marker.clone() });
    spanned(lexer, Token::OHeredoc { marker, flush }, start)
}

fn tokenize_heredoc(lexer: &mut Lexer, marker: &str) -> Result<Spanned, HclError> {
    let start = lexer.pos();
    let r = rest(lexer);

    if r.is_empty() {
        return Err(HclError::UnclosedString {
            quote: '<',
            line: start.line,
            column: start.column,
            hint: Some(format!("Heredoc is missing its closing marker {}", marker)),
            code: Some(103),
        });
    }

    if at_line_start(lexer) {
        let trimmed = r.trim_start_matches([' ', '\t']);
        if let Some(after) = trimmed.strip_prefix(marker) {
            if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
                let indent = r.len() - trimmed.len();
                bump_n(lexer, indent + marker.chars().count());
                lexer.modes.pop();
                return spanned(lexer, Token::CHeredoc, start);
            }
        }
    }

    if r.starts_with("${") {
        let token = open_sequence(lexer, false);
        return spanned(lexer, token, start);
    }
    if r.starts_with("%{") {
        let token = open_sequence(lexer, true);
        return spanned(lexer, token, start);
    }

    // Literal text up to the next sequence or the end of the line.
    let mut content = String::new();
    loop {
        if take_template_escape(lexer, &mut content) {
            continue;
        }
        let r = rest(lexer);
        if r.is_empty() || r.starts_with("${") || r.starts_with("%{") {
            break;
        }
        match bump(lexer) {
            Some('\n') => {
                content.push('\n');
                break;
            }
            Some(ch) => content.push(ch),
            None => break,
        }
    }

    spanned(lexer, Token::TemplateLiteral(content), start)
}
