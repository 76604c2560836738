use insta::assert_snapshot;
use mfl_common::span::Span;
use mfl_lexer::Lexer;
use mfl_parser::{parse, Expr, ExprKind};
use mfl_typeck::env::TypeEnv;
use mfl_typeck::subst::Types;
use mfl_typeck::ty::{Scheme, Ty, TyVar};
use mfl_typeck::{check, infer, ConstraintOrigin, TypeError, TypeckResult};

fn parse_src(source: &str) -> Expr {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    parse(&tokens).expect("parse failed")
}

fn check_src(source: &str) -> TypeckResult {
    check(&parse_src(source)).unwrap_or_else(|e| panic!("{source:?} failed to check: {e}"))
}

fn check_err(source: &str) -> TypeError {
    match check(&parse_src(source)) {
        Ok(result) => panic!("{source:?} unexpectedly checked as {}", result.scheme),
        Err(err) => err,
    }
}

fn span_of(source: &str, needle: &str) -> Span {
    let start = source.find(needle).expect("needle not in source") as u32;
    Span::new(start, start + needle.len() as u32)
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn double_is_int() {
    let result = check_src("let double = λx.(x*2) in (double 21)");
    assert_eq!(result.ty, Ty::int());
    assert_eq!(result.scheme.to_string(), "int");
}

#[test]
fn curried_add_is_int() {
    let result = check_src("let add = λx.λy.(x+y) in (add 3 4)");
    assert_eq!(result.scheme.to_string(), "int");
}

#[test]
fn add_with_bool_argument_is_a_mismatch() {
    let src = "let add = λx.λy.(x+y) in (add 3 True)";
    let err = check_err(src);
    assert_eq!(err.to_string(), "Type mismatch: int and bool");
    assert!(err.is_mismatch());
    assert_eq!(
        err.origin(),
        Some(&ConstraintOrigin::Apply {
            span: span_of(src, "add 3 True")
        })
    );
}

// ── Let-polymorphism ───────────────────────────────────────────────────

#[test]
fn let_bound_identity_is_polymorphic() {
    let result = check_src("let id = λx.x in id True & id 1 == 1");
    assert_eq!(result.ty, Ty::bool());
}

#[test]
fn lambda_bound_identity_is_monomorphic() {
    let err = check_err("(λid. id True & id 1 == 1) (λx.x)");
    assert!(err.is_mismatch());
    assert_eq!(err.to_string(), "Type mismatch: bool and int");
}

#[test]
fn let_binding_scheme_is_recorded() {
    let src = "let id = λx.x in id 1";
    let result = check_src(src);
    let scheme = result.binding_scheme(span_of(src, "id")).unwrap();
    assert_eq!(scheme.to_string(), "forall a. a -> a");
    assert_eq!(result.ty, Ty::int());
}

#[test]
fn nested_lets_shadow() {
    let result = check_src("let x = 1 in let x = x < 2 in !x");
    assert_eq!(result.ty, Ty::bool());
}

// ── Principal types ────────────────────────────────────────────────────

#[test]
fn identity_scheme() {
    assert_eq!(check_src("λx.x").scheme.to_string(), "forall a. a -> a");
}

#[test]
fn const_scheme() {
    assert_eq!(check_src("λx.λy.x").scheme.to_string(), "forall a b. a -> b -> a");
}

#[test]
fn twice_scheme() {
    assert_eq!(
        check_src("λf.λx.f (f x)").scheme.to_string(),
        "forall a. (a -> a) -> a -> a"
    );
}

#[test]
fn compose_scheme() {
    assert_eq!(
        check_src("λf.λg.λx.f (g x)").scheme.to_string(),
        "forall a b c. (a -> b) -> (c -> a) -> c -> b"
    );
}

#[test]
fn operators_fix_base_types() {
    assert_eq!(check_src("λx.x % 2 == 0").scheme.to_string(), "int -> bool");
    assert_eq!(check_src("λp.λq.!p | q").scheme.to_string(), "bool -> bool -> bool");
    assert_eq!(check_src("!(1 < 2) | False").ty, Ty::bool());
}

#[test]
fn principal_schemes_render_canonically() {
    let programs = [
        "λx.x",
        "λx.λy.x",
        "λf.λx.f (f x)",
        "λf.λg.λx.f (g x)",
        "λx.x % 2 == 0",
    ];
    let rendered: Vec<String> = programs
        .iter()
        .map(|src| format!("{src} : {}", check_src(src).scheme))
        .collect();
    assert_snapshot!(rendered.join("\n"), @r"
    λx.x : forall a. a -> a
    λx.λy.x : forall a b. a -> b -> a
    λf.λx.f (f x) : forall a. (a -> a) -> a -> a
    λf.λg.λx.f (g x) : forall a b c. (a -> b) -> (c -> a) -> c -> b
    λx.x % 2 == 0 : int -> bool
    ");
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn unbound_variable_reports_span() {
    let err = check_err("1 + y");
    assert_eq!(
        err,
        TypeError::UnboundVariable {
            name: "y".into(),
            span: Span::new(4, 5)
        }
    );
}

#[test]
fn binary_operand_mismatch() {
    let err = check_err("1 + True");
    assert_eq!(err.to_string(), "Type mismatch: bool and int");
    assert_eq!(err.span(), Some(Span::new(0, 8)));
}

#[test]
fn not_requires_bool() {
    let err = check_err("!3");
    assert_eq!(err.to_string(), "Type mismatch: int and bool");
}

#[test]
fn self_application_fails_occurs_check() {
    let err = check_err("λx.x x");
    assert!(matches!(err, TypeError::InfiniteType { .. }));
    assert!(err.is_mismatch());
    assert!(err.to_string().starts_with("Type mismatch: "));
}

#[test]
fn applying_a_non_function() {
    let err = check_err("1 2");
    assert_eq!(err.to_string(), "Type mismatch: int and int -> 't0");
}

#[test]
fn error_messages_render_canonically() {
    let programs = ["1 + True", "!3", "1 2", "1 + y"];
    let rendered: Vec<String> = programs
        .iter()
        .map(|src| format!("{src} => {}", check_err(src)))
        .collect();
    assert_snapshot!(rendered.join("\n"), @r"
    1 + True => Type mismatch: bool and int
    !3 => Type mismatch: int and bool
    1 2 => Type mismatch: int and int -> 't0
    1 + y => Unbound variable: y
    ");
}

// ── Node types ─────────────────────────────────────────────────────────

#[test]
fn node_types_are_fully_substituted() {
    let src = "let double = λx.(x*2) in (double 21)";
    let result = check_src(src);
    let binder = span_of(src, "double");
    assert_eq!(result.type_of(binder), Some(&Ty::fun(Ty::int(), Ty::int())));
    assert_eq!(result.type_of(span_of(src, "double 21")), Some(&Ty::int()));
    // the λ parameter
    assert_eq!(result.type_of(Span::new(15, 16)), Some(&Ty::int()));
    assert_eq!(
        result.binding_scheme(binder).map(|s| s.to_string()),
        Some("int -> int".to_string())
    );
}

#[test]
fn every_node_has_a_type() {
    let expr = parse_src("let add = λx.λy.(x+y) in (add 3 4)");
    let result = check(&expr).unwrap();
    fn walk(expr: &Expr, result: &TypeckResult) {
        assert!(result.type_of(expr.span).is_some(), "no type for {}", expr);
        match &expr.kind {
            ExprKind::Var(_) | ExprKind::Int(_) | ExprKind::Bool(_) => {}
            ExprKind::Binary { lhs, rhs, .. } => {
                walk(lhs, result);
                walk(rhs, result);
            }
            ExprKind::Unary { operand, .. } => walk(operand, result),
            ExprKind::Lambda { body, .. } => walk(body, result),
            ExprKind::Apply { func, arg } => {
                walk(func, result);
                walk(arg, result);
            }
            ExprKind::Let { value, body, .. } => {
                walk(value, result);
                walk(body, result);
            }
        }
    }
    walk(&expr, &result);
}

#[test]
fn unconstrained_binder_vars_are_closed_over() {
    let src = "(λy. let z = y in 5) (λq.q)";
    let result = check_src(src);
    let scheme = result.binding_scheme(span_of(src, "z")).unwrap();
    assert_eq!(scheme.to_string(), "forall a. a -> a");
    assert!(scheme.free_vars().is_empty());
}

// ── infer with a caller environment ────────────────────────────────────

#[test]
fn infer_under_environment() {
    let env = TypeEnv::new().extend("n", Scheme::mono(Ty::int()));
    let (ty, subst) = infer(&parse_src("n + 1"), &env).unwrap();
    assert_eq!(ty, Ty::int());
    assert_eq!(ty.apply(&subst), ty);
}

#[test]
fn infer_does_not_reuse_environment_vars() {
    let id = Scheme {
        vars: vec![TyVar(0)],
        ty: Ty::fun(Ty::var(0), Ty::var(0)),
    };
    let env = TypeEnv::new()
        .extend("id", id)
        .extend("w", Scheme::mono(Ty::var(1)));
    let (ty, subst) = infer(&parse_src("λv.id v"), &env).unwrap();
    assert_eq!(ty.vars_in_order().len(), 1);
    assert!(!ty.occurs(TyVar(1)));
    assert!(subst.get(TyVar(1)).is_none());
    // caller environment is untouched
    assert_eq!(env.lookup("w").unwrap().ty, Ty::var(1));
}

#[test]
fn repeated_inference_is_stable() {
    let expr = parse_src("let k = λx.λy.x in k (λz.z)");
    let first = check(&expr).unwrap().scheme.normalize();
    let second = check(&expr).unwrap().scheme.normalize();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "forall a b. a -> b -> b");
}
