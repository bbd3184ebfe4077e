use rill_ast::ast::Expr;
use rill_parse::{parse_str, parse_with_functions, scan};

#[test]
fn declaration_then_call() {
    let block = parse_str("let add(a, b) { return a + b; } add(2, 3);").unwrap();
    assert_eq!(block.exprs.len(), 2);
    let Expr::FnDecl { name, params, .. } = &block.exprs[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(name.text, "add");
    assert_eq!(params.len(), 2);
    let Expr::Call { name, args, .. } = &block.exprs[1] else {
        panic!("expected a call");
    };
    assert_eq!(name.text, "add");
    assert_eq!(args.len(), 2);
}

#[test]
fn declaration_accepts_a_trailing_semicolon() {
    let block = parse_str("let f() { return 1; }; f();").unwrap();
    assert_eq!(block.exprs.len(), 2);
}

#[test]
fn calls_may_pass_fewer_arguments_than_parameters() {
    let block = parse_str("let f(a, b) { return 1; } f(); f(1);").unwrap();
    assert_eq!(block.exprs.len(), 3);
}

#[test]
fn too_many_arguments_is_a_parse_error() {
    let err = parse_str("let f(a) { return a; } f(1, 2);").unwrap_err();
    assert!(
        err.to_string().contains("expects at most 1 argument(s), got 2"),
        "unexpected error: {err}"
    );
}

#[test]
fn calling_an_undeclared_name_is_a_parse_error() {
    let err = parse_str("f(1);").unwrap_err();
    assert!(
        err.to_string().contains("unknown function 'f'"),
        "unexpected error: {err}"
    );
}

#[test]
fn only_named_functions_are_callable() {
    let err = parse_str("3(1);").unwrap_err();
    assert!(
        err.to_string().contains("can only call a named function"),
        "unexpected error: {err}"
    );
}

#[test]
fn direct_recursion_resolves_inside_the_body() {
    let block = parse_str(
        "let fact(n) { if n < 2 { return 1; } else { return n * fact(n - 1); } } fact(5);",
    )
    .unwrap();
    assert_eq!(block.exprs.len(), 2);
}

#[test]
fn declarations_go_out_of_scope_with_their_block() {
    let err = parse_str("{ let f() { return 1; } } f();").unwrap_err();
    assert!(
        err.to_string().contains("unknown function 'f'"),
        "unexpected error: {err}"
    );
}

#[test]
fn seeded_symbol_table_keeps_earlier_functions_callable() {
    let toks = scan("add(1, 2);").unwrap();
    let block = parse_with_functions(toks, &[("add".to_string(), 2)]).unwrap();
    assert_eq!(block.exprs.len(), 1);
    assert!(matches!(&block.exprs[0], Expr::Call { .. }));
}

#[test]
fn call_arguments_may_be_full_expressions() {
    let block = parse_str("let f(a, b) { return a; } f(1 + 2, f(3, 4));").unwrap();
    let Expr::Call { args, .. } = &block.exprs[1] else {
        panic!("expected a call");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(&args[0], Expr::Binary { .. }));
    assert!(matches!(&args[1], Expr::Call { .. }));
}
