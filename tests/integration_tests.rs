//! Integration tests for the Fish front-end pipeline.

use fishc::frontend::{parse_and_analyze, preprocess, tokenize};
use fishc::prelude::*;
use std::path::Path;

fn sample(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("samples").join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {:?}: {}", path, e))
}

#[test]
fn test_scenario_pipeline() {
    let source = sample("scenario.fish");
    let text = preprocess(&source, WhitespaceMode::Preserve);

    // Lex
    let kinds: Vec<TokenKind> = tokenize(&text).into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Main,
            TokenKind::LeftBrace,
            TokenKind::Type(Type::Int),
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Delimiter,
            TokenKind::Print,
            TokenKind::LeftParen,
            TokenKind::Identifier,
            TokenKind::RightParen,
            TokenKind::Delimiter,
            TokenKind::RightBrace,
        ]
    );

    // Parse and analyze
    let ast = check(&source, &FrontendConfig::default()).expect("scenario should check");
    assert_eq!(
        ast.to_string(),
        "Program(Block(Declaration(x, Type(int), Initializer(Num(5))), Print(Var(x))))"
    );
}

#[test]
fn test_scenario_in_strip_mode() {
    let config = FrontendConfig {
        whitespace: WhitespaceMode::Strip,
        ..Default::default()
    };
    let stripped = check(&sample("scenario.fish"), &config).unwrap();
    let preserved = check(&sample("scenario.fish"), &FrontendConfig::default()).unwrap();
    assert_eq!(stripped.to_string(), preserved.to_string());
}

#[test]
fn test_functions_sample_is_clean() {
    let ast = check(&sample("functions.fish"), &FrontendConfig::default())
        .unwrap_or_else(|e| panic!("{}: {:?}", e, e.diagnostics()));

    let mut functions = Vec::new();
    ast.walk(&mut |node| {
        if node.kind == NodeKind::FunctionDef {
            functions.push(node.value_str().to_string());
        }
    });
    assert_eq!(functions, vec!["factorial", "describe"]);
}

#[test]
fn test_comments_keep_line_numbers() {
    let ast = parse(&sample("functions.fish"), &FrontendConfig::default()).unwrap();
    let block = ast.child(0).unwrap();
    // The first item is on line 4, after a two-line block comment.
    assert_eq!(block.child(0).unwrap().line, 4);
}

#[test]
fn test_semantic_errors_sample() {
    let err = check(&sample("semantic_errors.fish"), &FrontendConfig::default()).unwrap_err();
    let found: Vec<(DiagnosticKind, usize)> =
        err.diagnostics().iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(
        found,
        vec![
            (DiagnosticKind::Redeclaration, 3),
            (DiagnosticKind::UndeclaredVariable, 4),
            (DiagnosticKind::ArityMismatch, 8),
            (DiagnosticKind::TypeMismatch, 9),
            (DiagnosticKind::ReturnOutsideFunction, 10),
        ]
    );
    assert_eq!(err.to_string(), "5 semantic error(s) found");
}

#[test]
fn test_syntax_error_sample() {
    let err = parse(&sample("syntax_error.fish"), &FrontendConfig::default()).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
    assert_eq!(err.line(), Some(4));
    assert!(err.expected.contains(&"'<D'".to_string()));
    assert_eq!(err.found.as_deref(), Some("'}'"));
}

#[test]
fn test_syntax_error_stops_before_analysis() {
    let err = check("fish { splash(nobody) }", &FrontendConfig::default()).unwrap_err();
    assert!(matches!(err, FishError::Parse(_)));
    assert!(err.diagnostics().is_empty());
}

#[test]
fn test_missing_program_header() {
    let err = parse("{ <int x <D }", &FrontendConfig::default()).unwrap_err();
    assert_eq!(err.line(), Some(1));
    assert!(err.message.contains("fish"));
}

#[test]
fn test_truncated_program() {
    let err = parse("fish { <int x <= 1 <D", &FrontendConfig::default()).unwrap_err();
    assert_eq!(err.line(), None);
    assert_eq!(err.found.as_deref(), Some("end of input"));
}

#[test]
fn test_lexical_anomaly_reaches_parser() {
    let tokens = tokenize("fish { <int x <= 12ab <D }");
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Invalid && t.lexeme == "12ab"));

    let err = parse("fish { <int x <= 12ab <D }", &FrontendConfig::default()).unwrap_err();
    assert!(err.found.unwrap_or_default().contains("12ab"));
}

#[test]
fn test_line_comment_in_string_is_removed() {
    // Comment removal does not look inside literals.
    let text = preprocess("splash(\"a ~~ b\") <D\n", WhitespaceMode::Preserve);
    assert_eq!(text, "splash(\"a \n");
}

#[test]
fn test_parse_is_deterministic() {
    let source = sample("functions.fish");
    let config = FrontendConfig::default();
    let first = parse(&source, &config).unwrap();
    let second = parse(&source, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parse_and_analyze_returns_all_findings() {
    let (ast, diagnostics) = parse_and_analyze(
        "fish {\n  a <= 1 <D\n  b <= 2 <D\n  c() <D\n}",
    )
    .unwrap();
    assert_eq!(ast.node_count(), 8);
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics[2].kind, DiagnosticKind::UndeclaredFunction);
    assert_eq!(diagnostics[2].line, 4);
}

#[test]
fn test_ast_serializes() {
    let ast = check(&sample("scenario.fish"), &FrontendConfig::default()).unwrap();
    let json = serde_json::to_value(&ast).unwrap();
    assert_eq!(json["kind"], "Program");
    assert_eq!(json["children"][0]["children"][0]["value"], "x");
}
