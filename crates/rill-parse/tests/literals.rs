use rill_ast::ast::Expr;
use rill_parse::parse_str;

fn single(src: &str) -> Expr {
    let mut block = parse_str(src).unwrap();
    assert_eq!(block.exprs.len(), 1, "expected one expression in {src:?}");
    block.exprs.remove(0)
}

#[test]
fn integer_and_decimal_literals() {
    assert!(matches!(single("42;"), Expr::Number(n, _) if n == 42.0));
    assert!(matches!(single("3.25;"), Expr::Number(n, _) if n == 3.25));
    assert!(matches!(single("5.;"), Expr::Number(n, _) if n == 5.0));
}

#[test]
fn underscored_numeral_parses_to_its_plain_value() {
    assert!(matches!(single("1_000;"), Expr::Number(n, _) if n == 1000.0));
}

#[test]
fn string_literal() {
    let Expr::Str(s, _) = single(r#""hello world";"#) else {
        panic!("expected a string literal");
    };
    assert_eq!(s, "hello world");
}

#[test]
fn variable_reference() {
    let Expr::Var(ident) = single("abc;") else {
        panic!("expected a variable reference");
    };
    assert_eq!(ident.text, "abc");
}
