#[cfg(test)]
use super::*;

fn num(text: &str) -> Token {
    Token::Number(Number::parse(text).expect("valid number literal"))
}

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input)
        .tokenize()
        .expect("Failed to tokenize input")
        .into_iter()
        .map(|s| s.token)
        .collect()
}

#[test]
fn test_attribute_and_block_tokens() {
    let input = r#"
name = "web"
resource "aws_instance" "main" {
  count = 2
}
"#;

    let expected = vec![
        Token::Newline,
        Token::Ident("name".into()),
        Token::Equals,
        Token::OQuote,
        Token::TemplateLiteral("web".into()),
        Token::CQuote,
        Token::Newline,
        Token::Ident("resource".into()),
        Token::OQuote,
        Token::TemplateLiteral("aws_instance".into()),
        Token::CQuote,
        Token::OQuote,
        Token::TemplateLiteral("main".into()),
        Token::CQuote,
        Token::LBrace,
        Token::Newline,
        Token::Ident("count".into()),
        Token::Equals,
        num("2"),
        Token::Newline,
        Token::RBrace,
        Token::Newline,
        Token::Eof,
    ];

    let got = tokens(input);
    println!("{:?}", got);
    assert_eq!(got, expected);
}

#[test]
fn test_operators_and_punctuation() {
    let got = tokens("a == b != c <= d >= e && f || !g ? h : i => j ... k.l[0] % 2");
    assert!(got.contains(&Token::EqualEqual));
    assert!(got.contains(&Token::NotEqual));
    assert!(got.contains(&Token::LessEqual));
    assert!(got.contains(&Token::GreaterEqual));
    assert!(got.contains(&Token::And));
    assert!(got.contains(&Token::Or));
    assert!(got.contains(&Token::Bang));
    assert!(got.contains(&Token::Question));
    assert!(got.contains(&Token::Colon));
    assert!(got.contains(&Token::FatArrow));
    assert!(got.contains(&Token::Ellipsis));
    assert!(got.contains(&Token::Dot));
    assert!(got.contains(&Token::LBracket));
    assert!(got.contains(&Token::Percent));
}

#[test]
fn test_numbers() {
    assert_eq!(
        tokens("1 2.5 1e3 6.02E-2"),
        vec![
            num("1"),
            num("2.5"),
            num("1000"),
            num("0.0602"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_large_numbers_stay_exact() {
    assert_eq!(
        tokens("12345678901234567890 1e400"),
        vec![
            num("12345678901234567890"),
            num("1e400"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_number_exponent_out_of_range() {
    let result = Lexer::new("1e999999").tokenize();
    assert!(matches!(result, Err(HclError::InvalidToken { code: Some(102), .. })));
}

#[test]
fn test_identifiers_may_contain_dashes() {
    assert_eq!(
        tokens("aws-region_1"),
        vec![Token::Ident("aws-region_1".into()), Token::Eof]
    );
}

#[test]
fn test_comments_are_skipped() {
    let input = "# hash\na = 1 // slashes\n/* block\ncomment */ b = 2";
    assert_eq!(
        tokens(input),
        vec![
            Token::Newline,
            Token::Ident("a".into()),
            Token::Equals,
            num("1"),
            Token::Newline,
            Token::Ident("b".into()),
            Token::Equals,
            num("2"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_template_interpolation_and_directive() {
    let got = tokens(r#""a ${b} %{~ if c ~}d%{ endif }""#);
    println!("{:?}", got);
    assert_eq!(
        got,
        vec![
            Token::OQuote,
            Token::TemplateLiteral("a ".into()),
            Token::TemplateInterp { strip: false },
            Token::Ident("b".into()),
            Token::TemplateSeqEnd { strip: false },
            Token::TemplateLiteral(" ".into()),
            Token::TemplateControl { strip: true },
            Token::Ident("if".into()),
            Token::Ident("c".into()),
            Token::TemplateSeqEnd { strip: true },
            Token::TemplateLiteral("d".into()),
            Token::TemplateControl { strip: false },
            Token::Ident("endif".into()),
            Token::TemplateSeqEnd { strip: false },
            Token::CQuote,
            Token::Eof,
        ]
    );
}

#[test]
fn test_object_inside_interpolation_keeps_braces_balanced() {
    let got = tokens(r#""${ {a = 1}.a }""#);
    assert_eq!(got[1], Token::TemplateInterp { strip: false });
    assert!(got.contains(&Token::LBrace));
    assert!(got.contains(&Token::RBrace));
    assert_eq!(got[got.len() - 3], Token::TemplateSeqEnd { strip: false });
    assert_eq!(got[got.len() - 2], Token::CQuote);
}

#[test]
fn test_string_escapes() {
    let got = tokens(r#""tab\there \"q\" é $${lit} %%{lit}""#);
    assert_eq!(
        got[1],
        Token::TemplateLiteral("tab\there \"q\" é ${lit} %{lit}".into())
    );
}

#[test]
fn test_heredoc_tokens() {
    let input = "doc = <<EOT\nhello ${name}\n  EOT\n";
    let got = tokens(input);
    println!("{:?}", got);
    assert_eq!(
        got,
        vec![
            Token::Ident("doc".into()),
            Token::Equals,
            Token::OHeredoc { marker: "EOT".into(), flush: false },
            Token::TemplateLiteral("hello ".into()),
            Token::TemplateInterp { strip: false },
            Token::Ident("name".into()),
            Token::TemplateSeqEnd { strip: false },
            Token::TemplateLiteral("\n".into()),
            Token::CHeredoc,
            Token::Newline,
            Token::Eof,
        ]
    );
}

#[test]
fn test_flush_heredoc_marker() {
    let got = tokens("<<-EOT\n  x\nEOT");
    assert_eq!(got[0], Token::OHeredoc { marker: "EOT".into(), flush: true });
    assert_eq!(got[1], Token::TemplateLiteral("  x\n".into()));
    assert_eq!(got[2], Token::CHeredoc);
}

#[test]
fn test_token_ranges() {
    let spans = Lexer::new("ab = \"é\"\n  cd")
        .tokenize()
        .expect("Failed to tokenize input");

    assert_eq!(spans[0].range.start, Pos { line: 1, column: 1, byte: 0 });
    assert_eq!(spans[0].range.end, Pos { line: 1, column: 3, byte: 2 });

    // columns count characters, bytes count UTF-8 bytes
    let literal = &spans[3];
    assert_eq!(literal.token, Token::TemplateLiteral("é".into()));
    assert_eq!(literal.range.end.column, 8);
    assert_eq!(literal.range.end.byte, 8);

    let cd = spans.iter().find(|s| s.token == Token::Ident("cd".into())).expect("cd token");
    assert_eq!(cd.range.start.line, 2);
    assert_eq!(cd.range.start.column, 3);
}

#[test]
fn test_unclosed_string() {
    let result = Lexer::new("a = \"oops\nb = 1").tokenize();
    println!("{:?}", result);
    assert!(matches!(
        result,
        Err(HclError::UnclosedString { quote: '"', line: 1, code: Some(103), .. })
    ));
}

#[test]
fn test_unterminated_heredoc() {
    let result = Lexer::new("a = <<EOT\nno end\n").tokenize();
    assert!(matches!(result, Err(HclError::UnclosedString { quote: '<', .. })));
}

#[test]
fn test_invalid_escape() {
    let result = Lexer::new(r#""\q""#).tokenize();
    assert!(matches!(result, Err(HclError::InvalidToken { code: Some(105), .. })));
}

#[test]
fn test_unexpected_character() {
    let result = Lexer::new("a = @").tokenize();
    assert!(matches!(
        result,
        Err(HclError::UnexpectedCharacter { character: '@', line: 1, column: 5, .. })
    ));
}

#[test]
fn test_unterminated_block_comment() {
    let result = Lexer::new("/* never closed").tokenize();
    assert!(matches!(result, Err(HclError::UnexpectedEof { code: Some(106), .. })));
}
