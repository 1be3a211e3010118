#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::ast::{BinaryOp, Expression, LiteralValue, TraversalStep, UnaryOp};

fn parse(input: &str) -> File {
    parse_config(input.as_bytes(), "test.hcl").expect("Failed to parse input")
}

fn attr_expr<'a>(file: &'a File, name: &str) -> &'a Expression {
    &file.body.attributes.get(name).expect("attribute should exist").expr
}

#[test]
fn test_parser_basic_body() {
    let input = r#"
name = "web"
resource "aws_instance" "main" {
  ami = "ami-123"
  nested {
    x = 1
  }
}
"#;

    let file = parse(input);
    println!("--- Parsed File ---");
    println!("{:#?}", file.body);

    assert_eq!(file.filename, "test.hcl");
    assert_eq!(file.body.attributes.len(), 1);
    assert_eq!(file.body.blocks.len(), 1);

    let block = &file.body.blocks[0];
    assert_eq!(block.block_type, "resource");
    assert_eq!(block.labels, vec!["aws_instance".to_string(), "main".to_string()]);
    assert_eq!(block.type_range.start.line, 3);
    assert_eq!(block.type_range.start.column, 1);
    assert_eq!(block.type_range.end.column, 9);
    assert_eq!(block.label_ranges.len(), 2);
    assert!(block.body.attributes.contains_key("ami"));
    assert_eq!(block.body.blocks[0].block_type, "nested");

    // a nested body spans its braces
    assert_eq!(block.body.src_range.start, block.open_brace_range.start);
    assert_eq!(block.body.src_range.end, block.close_brace_range.end);
}

#[test]
fn test_parser_root_body_range() {
    let file = parse("a = 1\nb = 2\n");
    assert_eq!(file.body.src_range.start, Pos { line: 1, column: 1, byte: 0 });
    assert_eq!(file.body.src_range.end.line, 3);
}

#[test]
fn test_parser_single_line_block_and_bare_labels() {
    let file = parse("a b { x = 1 }\n");
    let block = &file.body.blocks[0];
    assert_eq!(block.labels, vec!["b".to_string()]);
    assert!(block.body.attributes.contains_key("x"));
}

#[test]
fn test_parser_literals() {
    let file = parse("n = 1.5\nt = true\nf = false\nz = null\n");
    assert!(matches!(attr_expr(&file, "n"), Expression::Literal { value: LiteralValue::Number(n), .. } if n.as_str() == "1.5"));
    assert!(matches!(attr_expr(&file, "t"), Expression::Literal { value: LiteralValue::Bool(true), .. }));
    assert!(matches!(attr_expr(&file, "f"), Expression::Literal { value: LiteralValue::Bool(false), .. }));
    assert!(matches!(attr_expr(&file, "z"), Expression::Literal { value: LiteralValue::Null, .. }));
}

#[test]
fn test_parser_traversal_steps() {
    let file = parse("a = var.list[0].name\nb = var.items[*].id\nc = local.map[var.key]\n");

    match attr_expr(&file, "a") {
        Expression::ScopeTraversal { root, steps, .. } => {
            assert_eq!(root, "var");
            assert_eq!(steps.len(), 3);
            assert!(matches!(&steps[1], TraversalStep::Index { key: LiteralValue::Number(n), .. } if n.as_str() == "0"));
        }
        other => panic!("Expected a scope traversal, got {:?}", other),
    }

    assert!(matches!(attr_expr(&file, "b"), Expression::Splat { full: true, .. }));
    assert!(matches!(attr_expr(&file, "c"), Expression::Index { .. }));
}

#[test]
fn test_parser_operator_precedence() {
    let file = parse("x = 1 + 2 * 3 == 7 || !ok\n");

    let Expression::Binary { op: BinaryOp::Or, lhs, rhs, .. } = attr_expr(&file, "x") else {
        panic!("Expected || at the top");
    };
    assert!(matches!(rhs.as_ref(), Expression::Unary { op: UnaryOp::Not, .. }));

    let Expression::Binary { op: BinaryOp::Equal, lhs, .. } = lhs.as_ref() else {
        panic!("Expected == under ||");
    };
    let Expression::Binary { op: BinaryOp::Add, rhs, .. } = lhs.as_ref() else {
        panic!("Expected + under ==");
    };
    assert!(matches!(rhs.as_ref(), Expression::Binary { op: BinaryOp::Multiply, .. }));
}

#[test]
fn test_parser_conditional_and_call() {
    let file = parse("x = length(var.list) > 0 ? upper(\"a\") : \"b\"\ny = concat(a, b...)\n");

    let Expression::Conditional { condition, true_result, .. } = attr_expr(&file, "x") else {
        panic!("Expected a conditional");
    };
    assert!(matches!(condition.as_ref(), Expression::Binary { op: BinaryOp::GreaterThan, .. }));
    assert!(matches!(true_result.as_ref(), Expression::FunctionCall { name, .. } if name == "upper"));

    match attr_expr(&file, "y") {
        Expression::FunctionCall { args, expand_final, .. } => {
            assert_eq!(args.len(), 2);
            assert!(*expand_final);
        }
        other => panic!("Expected a function call, got {:?}", other),
    }
}

#[test]
fn test_parser_multiline_tuple_and_object() {
    let input = r#"
list = [
  1,
  2,
]
obj = {
  a = 1
  "b" = 2, c: 3
}
"#;
    let file = parse(input);

    assert!(matches!(attr_expr(&file, "list"), Expression::Tuple { exprs, .. } if exprs.len() == 2));
    match attr_expr(&file, "obj") {
        Expression::Object { items, open_range, .. } => {
            assert_eq!(items.len(), 3);
            assert!(matches!(items[0].key_expr, Expression::ObjectKey { .. }));
            assert_eq!(open_range.start.line, 6);
            assert_eq!(open_range.start.column, 7);
        }
        other => panic!("Expected an object, got {:?}", other),
    }
}

#[test]
fn test_parser_for_expressions() {
    let file = parse("a = [for s in var.list : upper(s) if s != \"\"]\nb = {for k, v in var.map : v => k...}\n");

    match attr_expr(&file, "a") {
        Expression::For(f) => {
            assert_eq!(f.val_var, "s");
            assert!(f.key_var.is_none());
            assert!(f.cond_expr.is_some());
            assert!(!f.group);
        }
        other => panic!("Expected a for expression, got {:?}", other),
    }
    match attr_expr(&file, "b") {
        Expression::For(f) => {
            assert_eq!(f.key_var.as_deref(), Some("k"));
            assert!(f.key_expr.is_some());
            assert!(f.group);
        }
        other => panic!("Expected a for expression, got {:?}", other),
    }
}

#[test]
fn test_parser_template_shapes() {
    let file = parse("a = \"plain\"\nb = \"${var.x}\"\nc = \"x-${var.x}\"\nd = \"\"\n");

    match attr_expr(&file, "a") {
        Expression::Template(t) => assert!(t.is_string_literal()),
        other => panic!("Expected a template, got {:?}", other),
    }
    assert!(matches!(attr_expr(&file, "b"), Expression::TemplateWrap { .. }));
    match attr_expr(&file, "c") {
        Expression::Template(t) => {
            assert_eq!(t.parts.len(), 2);
            assert!(!t.is_string_literal());
        }
        other => panic!("Expected a template, got {:?}", other),
    }
    match attr_expr(&file, "d") {
        Expression::Template(t) => assert!(t.is_string_literal()),
        other => panic!("Expected a template, got {:?}", other),
    }
}

#[test]
fn test_parser_template_directives() {
    let file = parse("a = \"%{if c}yes%{else}no%{endif}\"\nb = \"%{for k, v in m}${k}%{endfor}\"\n");

    match attr_expr(&file, "a") {
        Expression::Template(t) => {
            assert_eq!(t.parts.len(), 1);
            assert!(matches!(t.parts[0], Expression::Conditional { .. }));
        }
        other => panic!("Expected a template, got {:?}", other),
    }
    match attr_expr(&file, "b") {
        Expression::Template(t) => match &t.parts[0] {
            Expression::TemplateJoin(f) => {
                assert_eq!(f.key_var.as_deref(), Some("k"));
                assert_eq!(f.val_var, "v");
            }
            other => panic!("Expected a template for, got {:?}", other),
        },
        other => panic!("Expected a template, got {:?}", other),
    }
}

#[test]
fn test_parser_strip_markers() {
    let file = parse("a = \"x   ${~ y ~}   z\"\n");
    match attr_expr(&file, "a") {
        Expression::Template(t) => {
            assert!(matches!(&t.parts[0], Expression::Literal { value: LiteralValue::String(s), .. } if s == "x"));
            assert!(matches!(&t.parts[2], Expression::Literal { value: LiteralValue::String(s), .. } if s == "z"));
        }
        other => panic!("Expected a template, got {:?}", other),
    }
}

#[test]
fn test_parser_heredocs() {
    let file = parse("a = <<EOT\nhello\n  world\nEOT\nb = <<-EOT\n    one\n      two\n    EOT\n");

    match attr_expr(&file, "a") {
        Expression::Template(t) => {
            let text: String = t
                .parts
                .iter()
                .filter_map(|p| match p {
                    Expression::Literal { value: LiteralValue::String(s), .. } => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(text, "hello\n  world\n");
        }
        other => panic!("Expected a template, got {:?}", other),
    }
    match attr_expr(&file, "b") {
        Expression::Template(t) => {
            let text: String = t
                .parts
                .iter()
                .filter_map(|p| match p {
                    Expression::Literal { value: LiteralValue::String(s), .. } => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(text, "one\n  two\n");
        }
        other => panic!("Expected a template, got {:?}", other),
    }
}

#[test]
fn test_parser_duplicate_attribute() {
    let result = parse_config(b"a = 1\na = 2\n", "dup.hcl");
    println!("{:?}", result);
    assert!(matches!(result, Err(HclError::SyntaxError { line: 2, code: Some(215), .. })));
}

#[test]
fn test_parser_missing_newline_between_items() {
    let result = parse_config(b"a = 1 b = 2\n", "bad.hcl");
    assert!(matches!(result, Err(HclError::InvalidToken { code: Some(207), .. })));
}

#[test]
fn test_parser_unclosed_block() {
    let result = parse_config(b"a {\n  x = 1\n", "bad.hcl");
    assert!(matches!(result, Err(HclError::UnexpectedEof { .. })));
}

#[test]
fn test_parser_interpolated_label_rejected() {
    let result = parse_config(b"a \"${x}\" {}\n", "bad.hcl");
    assert!(matches!(result, Err(HclError::SyntaxError { code: Some(216), .. })));
}

#[test]
fn test_parser_unmatched_directive() {
    let result = parse_config(b"a = \"%{if c}x\"\n", "bad.hcl");
    assert!(matches!(result, Err(HclError::SyntaxError { code: Some(218), .. })));
}

#[test]
fn test_parser_invalid_utf8() {
    let result = parse_config(&[b'a', b' ', b'=', b' ', 0xff], "bin.hcl");
    assert!(matches!(result, Err(HclError::SyntaxError { code: Some(100), .. })));
}
