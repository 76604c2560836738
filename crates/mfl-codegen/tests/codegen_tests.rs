use insta::assert_snapshot;
use mfl_codegen::core_ir::{CExpr, CVar};
use mfl_codegen::{generate, lower, CodegenError, CodegenOptions, PrintConfig};
use mfl_common::span::Span;
use mfl_lexer::Lexer;
use mfl_parser::{parse, Expr};
use mfl_typeck::{check, TypeckResult};

fn typed(source: &str) -> (Expr, TypeckResult) {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    let expr = parse(&tokens).expect("parse failed");
    let typeck = check(&expr).unwrap_or_else(|e| panic!("{source:?} failed to check: {e}"));
    (expr, typeck)
}

fn core(source: &str) -> String {
    let (expr, typeck) = typed(source);
    generate(&expr, &typeck, &CodegenOptions::default()).expect("codegen failed")
}

fn annotated(source: &str) -> String {
    let (expr, typeck) = typed(source);
    let options = CodegenOptions {
        annotate_types: true,
        ..CodegenOptions::default()
    };
    generate(&expr, &typeck, &options).expect("codegen failed")
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn double_module() {
    let text = core("let double = λx.(x*2) in (double 21)");
    assert!(text.contains("let <Double> = fun (X) ->"));
    assert!(text.contains("apply Double (21)"));
    assert_snapshot!(text.trim_end(), @r"
    module 'mfl' ['main'/0]
      attributes []
    'main'/0 =
      fun () ->
        let <Double> = fun (X) -> call 'erlang':'*' (X, 2) in
        apply Double (21)
    end
    ");
}

#[test]
fn curried_add_module() {
    let text = core("let add = λx.λy.(x+y) in (add 3 4)");
    assert_snapshot!(text.trim_end(), @r"
    module 'mfl' ['main'/0]
      attributes []
    'main'/0 =
      fun () ->
        let <Add> = fun (X) -> fun (Y) -> call 'erlang':'+' (X, Y) in
        apply (apply Add (3)) (4)
    end
    ");
}

#[test]
fn constant_program_fits_on_one_line() {
    let text = core("1 + 2");
    assert_snapshot!(text.trim_end(), @r"
    module 'mfl' ['main'/0]
      attributes []
    'main'/0 =
      fun () -> call 'erlang':'+' (1, 2)
    end
    ");
}

// ── Layout ─────────────────────────────────────────────────────────────

#[test]
fn narrow_width_breaks_let_and_fun() {
    let (expr, typeck) = typed("let double = λx.(x*2) in (double 21)");
    let module = lower(&expr, &typeck, &CodegenOptions::default()).expect("codegen failed");
    let config = PrintConfig {
        indent_size: 2,
        max_width: 40,
    };
    let text = module.render(&config);
    assert_snapshot!(text.trim_end(), @r"
    module 'mfl' ['main'/0]
      attributes []
    'main'/0 =
      fun () ->
        let <Double> =
          fun (X) ->
            call 'erlang':'*' (X, 2)
        in
        apply Double (21)
    end
    ");
}

#[test]
fn module_and_entry_names_are_configurable() {
    let (expr, typeck) = typed("True");
    let options = CodegenOptions {
        module_name: "demo".to_string(),
        entry_name: "start".to_string(),
        annotate_types: false,
    };
    let text = generate(&expr, &typeck, &options).expect("codegen failed");
    assert_eq!(
        text,
        "module 'demo' ['start'/0]\n  attributes []\n'start'/0 =\n  fun () -> 'true'\nend\n"
    );
}

// ── Operators ──────────────────────────────────────────────────────────

#[test]
fn operators_map_to_erlang_bifs() {
    let text = core("(7 / 2 == 3) & (7 % 2 != 0) | !(1 <= 2)");
    assert!(text.contains("call 'erlang':'div' (7, 2)"));
    assert!(text.contains("call 'erlang':'rem' (7, 2)"));
    assert!(text.contains("call 'erlang':'=:='"));
    assert!(text.contains("call 'erlang':'=/='"));
    assert!(text.contains("call 'erlang':'=<' (1, 2)"));
    assert!(text.contains("call 'erlang':'not'"));
    assert!(text.contains("call 'erlang':'and'"));
    assert!(text.contains("call 'erlang':'or'"));
}

#[test]
fn booleans_are_atoms() {
    let text = core("let b = False in b | True");
    assert!(text.contains("let <B> = 'false' in"));
    assert!(text.contains("call 'erlang':'or' (B, 'true')"));
}

// ── Binders ────────────────────────────────────────────────────────────

#[test]
fn shadowed_binders_get_distinct_variables() {
    let text = core("let x = 1 in let x = x + 1 in x");
    assert_snapshot!(text.trim_end(), @r"
    module 'mfl' ['main'/0]
      attributes []
    'main'/0 =
      fun () ->
        let <X> = 1 in
        let <X1> = call 'erlang':'+' (X, 1) in
        X1
    end
    ");
}

#[test]
fn lambda_parameter_does_not_reuse_let_variable() {
    let text = core("let x = 1 in (λx.x) x");
    assert!(text.contains("let <X> = 1 in"));
    assert!(text.contains("apply (fun (X1) -> X1) (X)"));
}

#[test]
fn suffix_skips_names_already_taken() {
    let text = core("let x1 = 1 in let x = 2 in let x = 3 in x + x1");
    assert!(text.contains("let <X1> = 1 in"));
    assert!(text.contains("let <X> = 2 in"));
    assert!(text.contains("let <X2> = 3 in"));
    assert!(text.contains("call 'erlang':'+' (X2, X1)"));
}

#[test]
fn polymorphic_binding_is_emitted_once() {
    let text = core("let id = λx.x in (let n = id 3 in id (n == 3))");
    assert_eq!(text.matches("fun (X) -> X").count(), 1);
    assert!(text.contains("apply Id (3)"));
}

// ── Type annotations ───────────────────────────────────────────────────

#[test]
fn annotations_carry_generalised_schemes() {
    let text = annotated("let id = λx.x in id 3");
    assert_snapshot!(text.trim_end(), @r#"
    module 'mfl' ['main'/0]
      attributes []
    'main'/0 =
      fun () ->
        let <Id> = ( fun (X) -> X -| [{'type', "forall a. a -> a"}] ) in
        apply Id (3)
    end
    "#);
}

#[test]
fn monomorphic_annotation() {
    let text = annotated("let double = λx.(x*2) in (double 21)");
    assert!(text.contains("-| [{'type', \"int -> int\"}] )"));
}

#[test]
fn annotation_without_binding_scheme_is_unresolved() {
    let (expr, _) = typed("let n = 1 in n");
    let (_, unrelated) = typed("2");
    let options = CodegenOptions {
        annotate_types: true,
        ..CodegenOptions::default()
    };
    let err = generate(&expr, &unrelated, &options).unwrap_err();
    assert_eq!(
        err,
        CodegenError::UnresolvedType {
            name: "n".to_string(),
            span: Span::new(4, 5),
        }
    );
    assert_eq!(err.to_string(), "type of `n` is not fully resolved");
}

#[test]
fn free_variable_is_unsupported() {
    let tokens = Lexer::tokenize("y + 1").expect("lex failed");
    let expr = parse(&tokens).expect("parse failed");
    let (_, typeck) = typed("0");
    let err = lower(&expr, &typeck, &CodegenOptions::default()).unwrap_err();
    assert_eq!(
        err,
        CodegenError::Unsupported {
            construct: "free variable `y`".to_string(),
            span: Span::new(0, 1),
        }
    );
}

#[test]
fn lowered_tree_shape() {
    let (expr, typeck) = typed("λf.f 1");
    let module = lower(&expr, &typeck, &CodegenOptions::default()).expect("codegen failed");
    assert_eq!(module.exports, vec![("main".to_string(), 0)]);
    let f = CVar("F".to_string());
    assert_eq!(
        module.defs[0].body,
        CExpr::Fun {
            params: vec![f.clone()],
            body: Box::new(CExpr::Apply {
                func: Box::new(CExpr::Var(f)),
                args: vec![CExpr::Int(1)],
            }),
        }
    );
}
