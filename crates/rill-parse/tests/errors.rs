use rill_parse::parse_str;

fn err_for(src: &str) -> String {
    parse_str(src).unwrap_err().to_string()
}

#[test]
fn missing_operand_after_infix_operator() {
    assert!(err_for("1 + ;").contains("expected operand after '+'"));
    assert!(err_for("x = ;").contains("expected operand after '='"));
}

#[test]
fn missing_operand_after_unary_operator() {
    assert!(err_for("-;").contains("expected operand after unary '-'"));
}

#[test]
fn unclosed_group() {
    assert!(err_for("(1 + 2;").contains("expected RParen"));
}

#[test]
fn unclosed_block() {
    assert!(err_for("{ 1;").contains("expected RBrace, found Eof"));
}

#[test]
fn if_requires_a_braced_body() {
    assert!(err_for("if 1 5;").contains("expected LBrace, found Number"));
}

#[test]
fn while_requires_a_braced_body() {
    assert!(err_for("while 1 x;").contains("expected LBrace"));
}

#[test]
fn let_requires_a_name() {
    assert!(err_for("let 5 = 1;").contains("expected Ident"));
}

#[test]
fn function_parameters_must_be_identifiers() {
    assert!(err_for("let f(1) { return 1; }").contains("expected Ident"));
}

#[test]
fn lex_errors_surface_through_parse_str() {
    assert!(err_for("1 @ 2;").contains("invalid token '@'"));
}

#[test]
fn empty_input_parses_to_an_empty_program() {
    let block = parse_str("").unwrap();
    assert!(block.exprs.is_empty());
}
