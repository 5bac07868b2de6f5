#[cfg(test)]
mod tests {
    use crate::core::queries::st_eq;
    use crate::transform::{self, simplify};
    use crate::{Econ, Expr, ExprKind, FunctionName, ISym, Simplify, SymbolTable, TransformGroup};

    fn table(names: &[&str]) -> (SymbolTable, Vec<Expr>) {
        let mut isyms = SymbolTable::new();
        let exprs = names
            .iter()
            .map(|name| Expr::symbol(isyms.push(ISym::real(*name))))
            .collect();
        (isyms, exprs)
    }

    fn simplified(expr: Expr) -> Expr {
        simplify::simplify(&Econ::bare(expr)).unwrap().expr
    }

    #[test]
    fn test_like_terms_merge() {
        // 2x + 3x -> 5x
        let (isyms, v) = table(&["x"]);
        let x = &v[0];
        let sum = Expr::add([
            Expr::mul([Expr::integer(2), x.clone()]),
            Expr::mul([Expr::integer(3), crate::core::edits::clone_expr(x)]),
        ]);
        let out = Simplify::new().simplify(&Econ::new(sum, isyms)).unwrap();
        assert!(st_eq(&out.expr, &Expr::mul([Expr::integer(5), x.clone()])));
        assert_eq!(crate::to_latex(&out).unwrap(), "5{x}");
    }

    #[test]
    fn test_like_terms_cancel() {
        // x + (-1)·x -> 0·x -> 0
        let (isyms, v) = table(&["x"]);
        let x = &v[0];
        let sum = Expr::add([x.clone(), Expr::mul([Expr::neg_one(), x.clone()])]);
        let econ = Econ::new(sum, isyms);
        let once = simplify::simplify_once(&econ).unwrap();
        let ExprKind::Add(terms) = once.expr.kind() else {
            panic!("expected a sum, got {:?}", once.expr);
        };
        assert!(terms[0].subs().is_some_and(|s| s[0].is_zero()));
        let out = Simplify::new().simplify(&econ).unwrap();
        assert!(out.expr.is_zero());
    }

    #[test]
    fn test_unit_fraction() {
        let out = simplified(Expr::fraction(Expr::one(), Expr::one()));
        assert!(out.is_one());
    }

    #[test]
    fn test_rational_arithmetic() {
        // 1/2 + 1/3 -> 5/6
        let sum = Expr::add([Expr::rational(1, 2), Expr::rational(1, 3)]);
        assert!(st_eq(&simplified(sum), &Expr::rational(5, 6)));

        // 4/6 canonicalizes to 2/3
        assert!(st_eq(&simplified(Expr::rational(4, 6)), &Expr::rational(2, 3)));

        // (2/3)^-1 -> 3/2
        let inv = Expr::inverse(Expr::rational(2, 3));
        assert!(st_eq(&simplified(inv), &Expr::rational(3, 2)));
    }

    #[test]
    fn test_zero_rules() {
        let (_, v) = table(&["x", "y"]);
        let product = Expr::mul([v[0].clone(), Expr::zero(), v[1].clone()]);
        assert!(simplified(product).is_zero());
        let power = Expr::pow(v[0].clone(), Expr::zero());
        assert!(simplified(power).is_one());
    }

    #[test]
    fn test_nested_fraction_flattens() {
        // (x / 2) / (y / 4) -> (2·x) / y
        let (_, v) = table(&["x", "y"]);
        let (x, y) = (&v[0], &v[1]);
        let nested = Expr::fraction(
            Expr::fraction(x.clone(), Expr::integer(2)),
            Expr::fraction(y.clone(), Expr::integer(4)),
        );
        let out = simplified(nested);
        let ExprKind::Fraction { num, den } = out.kind() else {
            panic!("expected a fraction, got {:?}", out);
        };
        assert!(st_eq(num, &Expr::mul([Expr::integer(2), x.clone()])));
        assert!(st_eq(den, y));
    }

    #[test]
    fn test_consecutive_powers_merge() {
        let (_, v) = table(&["x"]);
        let x = &v[0];
        let product = Expr::mul([
            Expr::pow(x.clone(), Expr::integer(2)),
            Expr::pow(x.clone(), Expr::integer(3)),
        ]);
        let out = simplified(product);
        assert!(st_eq(&out, &Expr::pow(x.clone(), Expr::integer(5))));
    }

    #[test]
    fn test_negative_square_root() {
        // √(-4) -> i·√4
        let out = simplified(Expr::sqrt(Expr::integer(-4)));
        assert!(st_eq(&out, &Expr::mul([Expr::i(), Expr::sqrt(Expr::integer(4))])));
    }

    #[test]
    fn test_symbolic_determinant() {
        // det [[a, b], [c, d]] -> a·d + (-1)·b·c
        let (isyms, v) = table(&["a", "b", "c", "d"]);
        let (a, b, c, d) = (&v[0], &v[1], &v[2], &v[3]);
        let det = Expr::function(
            FunctionName::Det,
            Expr::matrix([[a.clone(), b.clone()], [c.clone(), d.clone()]]),
        );
        let econ = Econ::new(det, isyms);
        let expanded = transform::apply(TransformGroup::Matrix, "determinant", &econ, &[]).unwrap();
        let out = transform::apply(TransformGroup::Base, "simplify", &expanded, &[]).unwrap();
        let expected = Expr::add([
            Expr::mul([a.clone(), d.clone()]),
            Expr::mul([Expr::neg_one(), b.clone(), c.clone()]),
        ]);
        assert!(st_eq(&out.expr, &expected));
        assert_eq!(out.expr.uid(), econ.expr.uid());
    }

    #[test]
    fn test_registered_simplify_keeps_root_uid() {
        let sum = Expr::add([Expr::integer(1), Expr::integer(2), Expr::integer(3)]);
        let econ = Econ::bare(sum);
        let out = transform::apply(TransformGroup::Base, "simplify", &econ, &[]).unwrap();
        assert!(st_eq(&out.expr, &Expr::integer(6)));
        assert_eq!(out.expr.uid(), econ.expr.uid());
    }

    #[test]
    fn test_symbols_travel_with_the_result() {
        let (isyms, v) = table(&["x"]);
        let econ = Econ::new(Expr::add([v[0].clone(), Expr::zero()]), isyms);
        let out = simplify::simplify(&econ).unwrap();
        assert_eq!(out.isyms.len(), 1);
        assert!(st_eq(&out.expr, &v[0]));
    }
}
