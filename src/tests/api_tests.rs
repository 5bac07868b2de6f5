use crate::core::queries::st_eq;
use crate::{
    CasError, Econ, Expr, ISym, LogicOperator, Paren, Simplify, SymbolTable, TransformGroup,
    registry, to_latex,
};

#[test]
fn test_builder_configuration() {
    let mut isyms = SymbolTable::new();
    let x = isyms.push(ISym::real("x"));
    let sum = Expr::add([Expr::symbol(x), Expr::integer(2), Expr::integer(3)]);
    let econ = Econ::new(sum, isyms);

    let out = Simplify::new().simplify(&econ).unwrap();
    assert_eq!(to_latex(&out).unwrap(), "5+{x}");

    // Zero passes returns the input
    let untouched = Simplify::new().max_passes(0).simplify(&econ).unwrap();
    assert!(st_eq(&untouched.expr, &econ.expr));

    let bare = Simplify::default()
        .simplify_expr(&Expr::fraction(Expr::integer(6), Expr::integer(4)))
        .unwrap();
    assert!(st_eq(&bare, &Expr::rational(3, 2)));
}

#[test]
fn test_display_and_latex_agree() {
    let mut isyms = SymbolTable::new();
    let theta = isyms.push(ISym::real("\\theta"));
    let expr = Expr::equal(
        Expr::symbol(theta),
        Expr::fraction(Expr::pi(), Expr::integer(2)),
    );
    let econ = Econ::new(expr, isyms);
    let tex = to_latex(&econ).unwrap();
    assert_eq!(tex, "{\\theta}=\\frac{\\pi}{2}");
    assert_eq!(econ.to_string(), tex);
}

#[test]
fn test_latex_of_structures() {
    let tex = |e: Expr| to_latex(&Econ::bare(e)).unwrap();
    assert_eq!(
        tex(Expr::logic(LogicOperator::Or, [Expr::one(), Expr::zero()])),
        "1\\lor 0"
    );
    assert_eq!(tex(Expr::norm(Expr::i())), "\\left|i\\right|");
    assert_eq!(tex(Expr::one().with_paren(Paren::On)), "\\left(1\\right)");
    assert_eq!(
        tex(Expr::times([Expr::integer(2), Expr::integer(3)])),
        "2\\times 3"
    );
    assert_eq!(tex(Expr::placeholder()), "\\square");
}

#[test]
fn test_errors_render() {
    let err = CasError::invalid("combine", "expected a sum");
    assert_eq!(err.to_string(), "combine: expected a sum");

    let econ = Econ::bare(Expr::one());
    let err = registry()
        .lookup(TransformGroup::Arith, "commute")
        .unwrap()
        .apply(&econ, &[])
        .unwrap_err();
    assert_eq!(err.to_string(), "commute takes 2 extra argument(s), got 0");
}

#[test]
fn test_registry_iterates_in_registration_order() {
    let names: Vec<_> = registry()
        .by_group(TransformGroup::Norm)
        .map(|t| t.name())
        .collect();
    assert_eq!(names, vec!["to_mul", "to_square"]);
    assert_eq!(registry().iter().count(), registry().len());
}
