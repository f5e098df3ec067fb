use pretty_assertions::assert_eq;

use inicio::frontend::token::TokenKind;
use inicio::runtime::RunConfig;
use inicio::utils::{Error, Stage};

fn output(source: &str) -> Vec<String> {
    let execution = inicio::run(source);
    assert_eq!(execution.error, None);
    execution.output
}

#[test]
fn test_tokens_for_declaration_and_print() {
    let kinds: Vec<TokenKind> = inicio::tokenize("var x = 5\nimprimir x\n")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Var,
            TokenKind::Id,
            TokenKind::Op,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Imprimir,
            TokenKind::Id,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_lex_error_line_counts_preceding_newlines() {
    let source = "inicio\nvar a = 1\n\nimprimir a @ 2\nfin";
    let newlines = source[..source.find('@').unwrap()].matches('\n').count();

    let err = inicio::tokenize(source).unwrap_err();
    assert_eq!(err, Error::Lex { line: newlines + 1, ch: '@' });
    assert_eq!(err.to_string(), "unexpected character @ at line 4");
}

#[test]
fn test_parse_requires_inicio_and_fin() {
    for source in ["imprimir 1\nfin", "inicio\nimprimir 1", "var x = 1", "fin\ninicio"] {
        let tokens = inicio::tokenize(source).unwrap();
        let err = inicio::parse(&tokens).unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
    }
}

#[test]
fn test_analysis_outline() {
    let analysis = inicio::analyze(
        "inicio\nvar x = 5\nsi x == 5 entonces\nimprimir \"yes\"\nsino\nimprimir \"no\"\nfin_si\nfin\n",
    )
    .unwrap();

    assert_eq!(
        analysis.tree.to_outline(),
        "inicio\n  var x = 5\n  si x == 5 entonces\n    imprimir \"yes\"\n  sino\n    imprimir \"no\"\n  fin\n"
    );
}

#[test]
fn test_analysis_is_repeatable() {
    let source = "inicio\npara var i = 0; i < 3; i = i + 1\nimprimir i\nfin_para\nfin";
    let first = inicio::analyze(source).unwrap();
    let second = inicio::analyze(source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_run_prints_variable() {
    assert_eq!(output("inicio\nvar x = 5\nimprimir x\nfin"), vec!["5"]);
}

#[test]
fn test_run_si() {
    assert_eq!(
        output("inicio\nvar x = 5\nsi x == 5 entonces\nimprimir \"yes\"\nfin_si\nfin"),
        vec!["yes"]
    );
    assert_eq!(
        output("inicio\nvar x = 6\nsi x == 5 entonces\nimprimir \"yes\"\nfin_si\nfin"),
        Vec::<String>::new()
    );
}

#[test]
fn test_run_para() {
    assert_eq!(
        output("inicio\npara var i = 0; i < 3; i = i + 1\nimprimir i\nfin_para\nfin"),
        vec!["0", "1", "2"]
    );
}

#[test]
fn test_flat_scope_across_blocks() {
    let source = "inicio\npara var i = 0; i < 2; i = i + 1\nfin_para\nvar j = i * 10\nimprimir j\nfin";
    assert_eq!(output(source), vec!["20"]);
}

#[test]
fn test_runaway_loop_is_bounded_by_config() {
    let config = RunConfig::new().with_max_iterations(100);
    let execution = inicio::run_with_config(
        "inicio\npara var i = 0; i >= 0; i = i + 1\nfin_para\nimprimir \"nunca\"\nfin",
        &config,
    );

    assert!(execution.output.is_empty());
    let err = execution.error.unwrap();
    assert_eq!(err.stage(), Stage::Runtime);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_host_code_is_never_evaluated() {
    let execution = inicio::run("inicio\nvar x = __import__(\"os\").system(\"ls\")\nfin");
    assert!(matches!(execution.error, Some(Error::Runtime { line: 2, .. })));
}
