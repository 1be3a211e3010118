use indexmap::IndexMap;

use super::*;
use crate::ast::{Attribute, Block, Body};

type Items = (IndexMap<String, Attribute>, Vec<Block>);

pub(super) fn parse_root_body(parser: &mut Parser) -> Result<Body, HclError> {
    let start = Pos { line: 1, column: 1, byte: 0 };
    let ((attributes, blocks), eof) = parse_items(parser, false)?;

    Ok(Body {
        attributes,
        blocks,
        src_range: Range::new(start, eof.range.end),
        end_range: eof.range,
    })
}

/// Read attributes and blocks up to end of input (root body) or the
/// closing `}` (nested body). Returns the items and the terminating token.
fn parse_items(parser: &mut Parser, nested: bool) -> Result<(Items, Spanned), HclError> {
    let mut attributes = IndexMap::new();
    let mut blocks = Vec::new();

    loop {
        let next = parser.peek()?.clone();
        match next.token {
            Token::Newline => {
                parser.bump()?;
            }
            Token::Eof if !nested => {
                let eof = parser.bump()?;
                return Ok(((attributes, blocks), eof));
            }
            Token::RBrace if nested => {
                let close = parser.bump()?;
                return Ok(((attributes, blocks), close));
            }
            Token::Ident(_) => {
                parse_item(parser, &mut attributes, &mut blocks)?;
            }
            _ => {
                let hint = if nested {
                    "Expected an attribute, a block or '}'"
                } else {
                    "Expected an attribute or a block"
                };
                return Err(parser.unexpected(&next, hint, 205));
            }
        }
    }
}

fn parse_item(
    parser: &mut Parser,
    attributes: &mut IndexMap<String, Attribute>,
    blocks: &mut Vec<Block>,
) -> Result<(), HclError> {
    let (name, name_range) = parser.expect_ident("Expected an attribute name or block type")?;

    let next = parser.peek()?.clone();
    match next.token {
        Token::Equals => {
            let attribute = parse_attribute(parser, name, name_range)?;
            if let Some(previous) = attributes.get(&attribute.name) {
                return Err(parser.syntax_error(
                    &attribute.name_range,
                    format!("Attribute '{}' redefined", attribute.name),
                    Some(format!(
                        "The attribute was already defined at line {}",
                        previous.name_range.start.line
                    )),
                    215,
                ));
            }
            attributes.insert(attribute.name.clone(), attribute);
        }
        Token::Ident(_) | Token::OQuote | Token::LBrace => {
            blocks.push(parse_block(parser, name, name_range)?);
        }
        _ => {
            return Err(parser.unexpected(
                &next,
                "Expected '=' for an attribute, or labels and '{' for a block",
                206,
            ));
        }
    }

    Ok(())
}

/// An item ends at a newline, at the end of input, or at the `}` of a
/// single-line block.
fn expect_item_end(parser: &mut Parser, what: &str) -> Result<(), HclError> {
    let next = parser.peek()?.clone();
    match next.token {
        Token::Newline => {
            parser.bump()?;
            Ok(())
        }
        Token::Eof | Token::RBrace => Ok(()),
        _ => Err(parser.unexpected(&next, &format!("Expected a newline after the {}", what), 207)),
    }
}

fn parse_attribute(parser: &mut Parser, name: String, name_range: Range) -> Result<Attribute, HclError> {
    let equals = parser.bump()?;
    let expr = expression::parse_expression(parser)?;
    let src_range = Range::new(name_range.start, expr.range().end);
    expect_item_end(parser, "attribute")?;

    Ok(Attribute {
        name,
        expr,
        src_range,
        name_range,
        equals_range: equals.range,
    })
}

fn parse_block(parser: &mut Parser, block_type: String, type_range: Range) -> Result<Block, HclError> {
    let mut labels = Vec::new();
    let mut label_ranges = Vec::new();

    loop {
        let next = parser.peek()?.clone();
        match next.token {
            Token::Ident(label) => {
                parser.bump()?;
                labels.push(label);
                label_ranges.push(next.range);
            }
            Token::OQuote => {
                let (label, range) = parse_quoted_label(parser)?;
                labels.push(label);
                label_ranges.push(range);
            }
            Token::LBrace => break,
            _ => return Err(parser.unexpected(&next, "Expected a block label or '{'", 208)),
        }
    }

    let open = parser.bump()?;
    let ((attributes, blocks), close) = parse_items(parser, true)?;
    expect_item_end(parser, "block")?;

    Ok(Block {
        block_type,
        labels,
        body: Body {
            attributes,
            blocks,
            src_range: open.range.join(&close.range),
            end_range: close.range,
        },
        type_range,
        label_ranges,
        open_brace_range: open.range,
        close_brace_range: close.range,
    })
}

/// A quoted label may hold escapes but no interpolation.
fn parse_quoted_label(parser: &mut Parser) -> Result<(String, Range), HclError> {
    let open = parser.bump()?;
    let mut label = String::new();

    loop {
        let next = parser.bump()?;
        match next.token {
            Token::TemplateLiteral(text) => label.push_str(&text),
            Token::CQuote => return Ok((label, open.range.join(&next.range))),
            _ => {
                return Err(parser.syntax_error(
                    &next.range,
                    "Block labels must be literal strings".into(),
                    Some("Template sequences are not allowed in block labels".into()),
                    216,
                ));
            }
        }
    }
}
