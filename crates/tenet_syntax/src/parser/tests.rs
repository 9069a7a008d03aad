#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on specific syntactic forms and on error recovery (one error per broken rule).
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_str(source: &str) -> Result<Module, Vec<CompileError>> {
        let tokens = lexer::lex(source).map_err(|_| vec![])?;
        parse(&tokens)
    }

    fn single_body(source: &str) -> Vec<Spanned<BodyExpr>> {
        let module = parse_str(source).unwrap();
        module.rules[0].node.body.clone().unwrap()
    }

    #[test]
    fn test_parse_package_path() {
        let module = parse_str("package a.b.c\n").unwrap();
        assert_eq!(module.package_path(), "a.b.c");
        assert!(module.rules.is_empty());
    }

    #[test]
    fn test_missing_package_is_error() {
        let err = parse_str("allow { true }\n").unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err[0].message.contains("Expected 'package' declaration"));
    }

    #[test]
    fn test_parse_rule_forms() {
        let source = r#"
package foo

default allow = false
allow { input.user == "admin" }
limit = 10
grade = "a" { input.score > 90 }
"#;
        let module = parse_str(source).unwrap();
        assert_eq!(module.rules.len(), 4);

        let default = &module.rules[0].node;
        assert!(default.is_default);
        assert!(default.body.is_none());

        let allow = &module.rules[1].node;
        assert_eq!(allow.name.node, "allow");
        assert!(allow.value.is_none());
        assert_eq!(allow.body_exprs().len(), 1);

        let limit = &module.rules[2].node;
        assert!(matches!(limit.value.as_ref().map(|v| &v.node), Some(Expr::Literal(Literal::Number(n))) if *n == 10.0));

        let grade = &module.rules[3].node;
        assert!(grade.value.is_some() && grade.body.is_some());
    }

    #[test]
    fn test_body_separators() {
        let body = single_body("package p\ntest_x {\n  x := 1; y := 2\n\n  x < y\n}\n");
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_not_prefix() {
        let body = single_body("package p\ndeny { not input.admin }\n");
        assert!(body[0].node.negated);
        assert_eq!(body[0].node.to_string(), "not input.admin");
    }

    #[test]
    fn test_refs_and_calls() {
        let body = single_body("package p\nr { count(input.xs[0].tags) > 1; strings.lower(data.p.name) }\n");
        match &body[0].node.expr.node {
            Expr::Binary(lhs, BinaryOp::Gt, _) => match &lhs.node {
                Expr::Call { name, args } => {
                    assert_eq!(name, &vec!["count".to_string()]);
                    match &args[0].node {
                        Expr::Ref(r) => {
                            assert_eq!(r.head, "input");
                            assert_eq!(r.path.len(), 3);
                        }
                        other => panic!("Expected ref argument, got {:?}", other),
                    }
                }
                other => panic!("Expected call, got {:?}", other),
            },
            other => panic!("Expected comparison, got {:?}", other),
        }
        match &body[1].node.expr.node {
            Expr::Call { name, .. } => assert_eq!(name.join("."), "strings.lower"),
            other => panic!("Expected dotted call, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let body = single_body("package p\nr { x := 1 + 2 * 3 }\n");
        assert_eq!(body[0].node.expr.node.to_string(), "x := 1 + 2 * 3");
        match &body[0].node.expr.node {
            Expr::Binary(_, BinaryOp::Assign, rhs) => {
                assert!(matches!(rhs.node, Expr::Binary(_, BinaryOp::Add, _)));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_literal_folds() {
        let body = single_body("package p\nr { x := -2 }\n");
        match &body[0].node.expr.node {
            Expr::Binary(_, _, rhs) => assert_eq!(rhs.node, Expr::Literal(Literal::Number(-2.0))),
            other => panic!("Expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_collections() {
        let source = "package p\nr {\n  xs := [\n    1,\n    2,\n  ]\n  o := {\n    \"a\": 1,\n  }\n}\n";
        let body = single_body(source);
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].node.to_string(), "xs := [1, 2]");
        assert_eq!(body[1].node.to_string(), "o := {\"a\": 1}");
    }

    #[test]
    fn test_chained_comparison_rejected() {
        let err = parse_str("package p\nr { 1 < 2 < 3 }\n").unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err[0].message.contains("cannot be chained"));
    }

    #[test]
    fn test_empty_body_rejected() {
        let err = parse_str("package p\nr { }\n").unwrap_err();
        assert!(err[0].message.contains("empty rule body"));
    }

    #[test]
    fn test_rule_without_value_or_body() {
        let err = parse_str("package p\nr\n").unwrap_err();
        assert!(err[0].message.contains("needs a value or a body"));
    }

    #[test]
    fn test_recovery_reports_each_broken_rule() {
        let err = parse_str("package p\na { 1 + }\nb { true }\nc { x := }\n").unwrap_err();
        assert_eq!(err.len(), 2, "one error per broken rule, got {:?}", err);
        assert!(err.iter().all(|e| e.message.contains("Expected expression")));
    }

    #[test]
    fn test_rule_spans_cover_definition() {
        let source = "package p\n\ntest_a { true }\n";
        let module = parse_str(source).unwrap();
        let span = module.rules[0].span;
        assert_eq!(&source[span.start..span.end], "test_a { true }");
    }

    #[test]
    fn test_parse_source_helper() {
        let module = parse_source("package x\ny = 1\n").unwrap();
        assert_eq!(module.to_string(), "package x\ny = 1\n");
    }
}
