#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use crate::core::edits::clone_expr;
    use crate::core::queries::{contains_uid, st_eq};
    use crate::transform::{self, simplify::simplify};
    use crate::{
        Arity, CasError, Econ, Expr, ExprKind, ISym, ISymKind, Paren, SymbolTable, TransformGroup,
        registry,
    };

    fn symbols(names: &[&str]) -> (SymbolTable, Vec<Expr>) {
        let mut isyms = SymbolTable::new();
        let exprs = names
            .iter()
            .map(|name| Expr::symbol(isyms.push(ISym::real(*name))))
            .collect();
        (isyms, exprs)
    }

    fn run(group: TransformGroup, name: &str, expr: &Expr, args: &[Expr]) -> Expr {
        transform::apply(group, name, &Econ::bare(expr.clone()), args)
            .unwrap()
            .expr
    }

    fn fails(group: TransformGroup, name: &str, expr: &Expr, args: &[Expr]) -> bool {
        matches!(
            transform::apply(group, name, &Econ::bare(expr.clone()), args),
            Err(CasError::InvalidOperation { .. })
        )
    }

    // =========================================================================
    // Registry
    // =========================================================================

    #[test]
    fn test_every_group_is_populated() {
        let registry = registry();
        for group in TransformGroup::ALL {
            let names: Vec<_> = registry.by_group(group).map(|t| t.name()).collect();
            assert!(!names.is_empty(), "group {} is empty", group.name());
            let unique: FxHashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len());
        }
        assert!(registry.get(TransformGroup::Arith, "flatten").is_some());
        assert!(registry.get(TransformGroup::Arith, "determinant").is_none());
    }

    #[test]
    fn test_unknown_transformation() {
        let econ = Econ::bare(Expr::one());
        let err = transform::apply(TransformGroup::Trig, "no_such_rule", &econ, &[]).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_arity_is_checked_before_running() {
        let econ = Econ::bare(Expr::mul([Expr::one(), Expr::zero()]));
        let err = transform::apply(TransformGroup::Arith, "commute", &econ, &[]).unwrap_err();
        assert!(matches!(err, CasError::ArityMismatch { found: 0, .. }));
        let commute = registry().lookup(TransformGroup::Arith, "commute").unwrap();
        assert_eq!(commute.arity(), Arity::Fixed(2));
        assert_eq!(
            registry().lookup(TransformGroup::Arith, "extract").unwrap().arity(),
            Arity::Variadic
        );
    }

    #[test]
    fn test_apply_or_keep() {
        let econ = Econ::bare(Expr::integer(4));
        let combine = registry().lookup(TransformGroup::Arith, "combine").unwrap();
        let kept = combine.apply_or_keep(&econ, &[]).unwrap();
        assert_eq!(kept.expr.uid(), econ.expr.uid());
        assert!(combine.apply(&econ, &[]).is_err());

        // Arity errors are not swallowed
        let commute = registry().lookup(TransformGroup::Arith, "commute").unwrap();
        assert!(commute.apply_or_keep(&econ, &[]).is_err());
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    #[test]
    fn test_flatten() {
        let (_, v) = symbols(&["x", "y"]);
        let nested = Expr::add([
            Expr::one(),
            Expr::add([v[0].clone(), Expr::add([v[1].clone()])]),
        ]);
        let out = run(TransformGroup::Arith, "flatten", &nested, &[]);
        assert!(st_eq(
            &out,
            &Expr::add([Expr::one(), v[0].clone(), v[1].clone()])
        ));
        assert_eq!(out.uid(), nested.uid());
    }

    #[test]
    fn test_distribute() {
        let (_, v) = symbols(&["a", "b", "c", "d"]);
        let (a, b, c, d) = (&v[0], &v[1], &v[2], &v[3]);
        let product = Expr::mul([a.clone(), Expr::add([b.clone(), c.clone()]), d.clone()]);
        let out = run(TransformGroup::Arith, "distribute", &product, &[]);
        let expected = Expr::add([
            Expr::mul([a.clone(), b.clone(), d.clone()]),
            Expr::mul([a.clone(), c.clone(), d.clone()]),
        ]);
        assert!(st_eq(&out, &expected));
        assert_eq!(out.uid(), product.uid());
        // Copies of the outer factors get fresh uids, the summands keep theirs
        assert!(!contains_uid(&out, a.uid()));
        assert!(contains_uid(&out, b.uid()));

        let power = Expr::pow(Expr::fraction(a.clone(), b.clone()), Expr::integer(2));
        let out = run(TransformGroup::Arith, "distribute", &power, &[]);
        assert!(st_eq(
            &out,
            &Expr::fraction(
                Expr::pow(a.clone(), Expr::integer(2)),
                Expr::pow(b.clone(), Expr::integer(2))
            )
        ));
    }

    #[test]
    fn test_combine_prefix_and_suffix() {
        let (_, v) = symbols(&["a", "b", "c"]);
        let (a, b, c) = (&v[0], &v[1], &v[2]);
        let leading = Expr::add([
            Expr::mul([a.clone(), b.clone()]),
            Expr::mul([a.clone(), c.clone()]),
        ]);
        let out = run(TransformGroup::Arith, "combine", &leading, &[]);
        assert!(st_eq(
            &out,
            &Expr::mul([a.clone(), Expr::add([b.clone(), c.clone()])])
        ));

        let trailing = Expr::add([
            Expr::mul([b.clone(), a.clone()]),
            Expr::mul([c.clone(), a.clone()]),
        ]);
        let out = run(TransformGroup::Arith, "combine", &trailing, &[]);
        assert!(st_eq(
            &out,
            &Expr::mul([Expr::add([b.clone(), c.clone()]), a.clone()])
        ));

        let mixed = Expr::add([Expr::mul([a.clone(), b.clone()]), c.clone()]);
        assert!(fails(TransformGroup::Arith, "combine", &mixed, &[]));
    }

    #[test]
    fn test_extract() {
        let (_, v) = symbols(&["x", "y"]);
        let (x, y) = (&v[0], &v[1]);
        // x·y + x -> x·(y + 1)
        let sum = Expr::add([Expr::mul([x.clone(), y.clone()]), clone_expr(x)]);
        let out = run(TransformGroup::Arith, "extract", &sum, std::slice::from_ref(x));
        assert!(st_eq(
            &out,
            &Expr::mul([x.clone(), Expr::add([y.clone(), Expr::one()])])
        ));
        assert_eq!(out.uid(), sum.uid());

        // x·y + y -> x·(y + y/x)
        let sum = Expr::add([Expr::mul([x.clone(), y.clone()]), clone_expr(y)]);
        let out = run(TransformGroup::Arith, "extract", &sum, std::slice::from_ref(x));
        assert!(st_eq(
            &out,
            &Expr::mul([
                x.clone(),
                Expr::add([y.clone(), Expr::fraction(y.clone(), x.clone())])
            ])
        ));

        assert!(fails(TransformGroup::Arith, "extract", &sum, &[x.clone(), x.clone()]));
        assert!(fails(TransformGroup::Arith, "extract", &sum, &[]));
    }

    #[test]
    fn test_as_fraction() {
        let (_, v) = symbols(&["a", "b", "c"]);
        let (a, b, c) = (&v[0], &v[1], &v[2]);
        let product = Expr::mul([a.clone(), Expr::fraction(b.clone(), c.clone())]);
        let out = run(TransformGroup::Arith, "as_fraction", &product, &[]);
        assert!(st_eq(
            &out,
            &Expr::fraction(
                Expr::mul([Expr::one(), a.clone(), b.clone()]),
                Expr::mul([Expr::one(), c.clone()])
            )
        ));
    }

    #[test]
    fn test_reordering() {
        let (_, v) = symbols(&["a", "b", "c", "d"]);
        let (a, b, c, d) = (&v[0], &v[1], &v[2], &v[3]);
        let product = Expr::mul([a.clone(), b.clone(), c.clone(), d.clone()]);

        let split = run(TransformGroup::Arith, "split", &product, &[c.clone(), b.clone()]);
        let subs = split.subs().unwrap();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[1].paren(), Paren::On);
        assert!(st_eq(&subs[1], &Expr::mul([b.clone(), c.clone()])));
        assert!(fails(TransformGroup::Arith, "split", &product, &[a.clone(), c.clone()]));

        let swapped = run(TransformGroup::Arith, "commute", &product, &[b.clone(), a.clone()]);
        let order: Vec<_> = swapped.subs().unwrap().iter().map(|s| s.uid()).collect();
        assert_eq!(order, vec![b.uid(), a.uid(), c.uid(), d.uid()]);
        assert!(fails(TransformGroup::Arith, "commute", &product, &[a.clone(), d.clone()]));

        let moved = run(TransformGroup::Arith, "to_end", &product, std::slice::from_ref(a));
        let order: Vec<_> = moved.subs().unwrap().iter().map(|s| s.uid()).collect();
        assert_eq!(order, vec![b.uid(), c.uid(), d.uid(), a.uid()]);
    }

    // =========================================================================
    // Equations and linear systems
    // =========================================================================

    #[test]
    fn test_move_term_across_equal() {
        let (_, v) = symbols(&["x", "y"]);
        let one = Expr::one();
        let eq = Expr::equal(Expr::add([v[0].clone(), one.clone()]), v[1].clone());
        let out = run(TransformGroup::Equal, "move_term", &eq, std::slice::from_ref(&one));
        let ExprKind::Equal { left, right } = out.kind() else {
            panic!("expected an equation");
        };
        assert!(st_eq(left, &Expr::add([v[0].clone()])));
        assert!(st_eq(right, &Expr::minus(v[1].clone(), Expr::one())));
        assert_eq!(out.uid(), eq.uid());
    }

    #[test]
    fn test_linear_system_round_trip() {
        let (_, v) = symbols(&["x", "y"]);
        let (x, y) = (&v[0], &v[1]);
        // 2x + 3y = 5, x + (-1)y = 1
        let system = Expr::group([
            Expr::equal(
                Expr::add([
                    Expr::mul([Expr::integer(2), x.clone()]),
                    Expr::mul([Expr::integer(3), y.clone()]),
                ]),
                Expr::integer(5),
            ),
            Expr::equal(
                Expr::add([x.clone(), Expr::mul([Expr::neg_one(), y.clone()])]),
                Expr::integer(1),
            ),
        ]);
        let out = run(TransformGroup::Linear, "to_matrix", &system, &[x.clone(), y.clone()]);
        let ExprKind::Equal { left, right } = out.kind() else {
            panic!("expected an equation");
        };
        let factors = left.subs().unwrap();
        let coeffs = factors[0].rows().unwrap();
        let value = |e: &Expr| simplify(&Econ::bare(e.clone())).unwrap().expr;
        let expected = [[2, 3], [1, -1]];
        for (row, want) in coeffs.iter().zip(expected) {
            for (entry, w) in row.iter().zip(want) {
                assert!(st_eq(&value(&**entry), &Expr::integer(w)));
            }
        }
        assert!(st_eq(&factors[1], &Expr::matrix([[x.clone()], [y.clone()]])));
        assert_eq!(right.rows().unwrap().len(), 2);

        assert!(fails(TransformGroup::Linear, "to_matrix", &system, std::slice::from_ref(x)));

        let columns = Expr::equal(
            Expr::matrix([[x.clone()], [y.clone()]]),
            Expr::matrix([[Expr::one()], [Expr::zero()]]),
        );
        let group = run(TransformGroup::Linear, "to_group", &columns, &[]);
        assert!(st_eq(
            &group,
            &Expr::group([
                Expr::equal(x.clone(), Expr::one()),
                Expr::equal(y.clone(), Expr::zero())
            ])
        ));
    }

    // =========================================================================
    // Norms and sequences
    // =========================================================================

    #[test]
    fn test_norm_square() {
        let (_, v) = symbols(&["z"]);
        let z = &v[0];
        let squared = Expr::pow(Expr::norm(z.clone()), Expr::integer(2));
        let product = run(TransformGroup::Norm, "to_mul", &squared, &[]);
        assert!(st_eq(
            &product,
            &Expr::mul([Expr::conjugate(z.clone()), z.clone()])
        ));
        let back = run(TransformGroup::Norm, "to_square", &product, &[]);
        assert!(st_eq(&back, &squared));

        let cubed = Expr::pow(Expr::norm(z.clone()), Expr::integer(3));
        assert!(fails(TransformGroup::Norm, "to_mul", &cubed, &[]));
        let mismatched = Expr::mul([Expr::conjugate(z.clone()), Expr::one()]);
        assert!(fails(TransformGroup::Norm, "to_square", &mismatched, &[]));
    }

    #[test]
    fn test_sequence_expand() {
        let mut isyms = SymbolTable::new();
        let x = Expr::symbol(isyms.push(ISym::real("x")));
        let n = isyms.push(ISym::new("n", ISymKind::Context));
        let seq = Expr::sequence(x.clone(), n);
        let sum = Expr::add([seq.clone(), Expr::one()]);
        let econ = Econ::new(sum, isyms);

        let out = transform::apply(TransformGroup::Seq, "expand", &econ, std::slice::from_ref(&seq))
            .unwrap();
        let ExprKind::InfiniteSequence { elem, index } = out.expr.kind() else {
            panic!("expected a sequence");
        };
        assert_eq!(*index, n);
        assert!(st_eq(elem, &Expr::add([x, Expr::one()])));

        let stray = Expr::sequence(Expr::one(), n);
        let err = transform::apply(TransformGroup::Seq, "expand", &econ, &[stray]).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    // =========================================================================
    // Substitution
    // =========================================================================

    #[test]
    fn test_replace_by_rule() {
        let (isyms, v) = symbols(&["x", "y", "z"]);
        let (x, y, z) = (&v[0], &v[1], &v[2]);
        let xy = || Expr::mul([clone_expr(x), clone_expr(y)]);
        let f = Expr::add([xy(), Expr::one(), xy()]);
        let request = Expr::group([f, Expr::equal(xy(), z.clone())]);
        let out = transform::apply(TransformGroup::Base, "replace", &Econ::new(request, isyms), &[])
            .unwrap();
        assert!(st_eq(
            &out.expr,
            &Expr::add([z.clone(), Expr::one(), z.clone()])
        ));
    }

    #[test]
    fn test_replace_with_symbol_and_restore() {
        let (isyms, v) = symbols(&["x", "y"]);
        let first = Expr::mul([v[0].clone(), v[1].clone()]);
        let sum = Expr::add([first.clone(), clone_expr(&first)]);
        let econ = Econ::new(sum, isyms);

        let out = transform::apply(
            TransformGroup::Base,
            "replace_with_symbol",
            &econ,
            std::slice::from_ref(&first),
        )
        .unwrap();
        assert_eq!(out.isyms.len(), econ.isyms.len() + 1);
        let subs = out.expr.subs().unwrap();
        assert!(st_eq(&subs[0], &subs[1]));
        assert!(matches!(subs[0].kind(), ExprKind::Symbol(_)));
        assert_eq!(crate::to_latex(&out).unwrap(), "{u}+{u}");

        let u = out.with_expr((*subs[1]).clone());
        let restored = transform::apply(TransformGroup::Base, "restore_replacement", &u, &[]).unwrap();
        assert!(st_eq(&restored.expr, &first));
        assert_ne!(restored.expr.uid(), first.uid());
    }

    #[test]
    fn test_copy_into_placeholder() {
        let (isyms, v) = symbols(&["x"]);
        let source = Expr::pow(v[0].clone(), Expr::integer(2));
        let target = Econ::new(Expr::placeholder(), isyms);
        let out = transform::apply(TransformGroup::Base, "copy", &target, std::slice::from_ref(&source))
            .unwrap();
        assert!(st_eq(&out.expr, &source));
        assert_eq!(out.expr.uid(), target.expr.uid());

        let occupied = target.with_expr(Expr::one());
        assert!(transform::apply(TransformGroup::Base, "copy", &occupied, &[source]).is_err());
    }

    // =========================================================================
    // Trigonometry
    // =========================================================================

    #[test]
    fn test_arcsin_zero_introduces_index() {
        let econ = Econ::bare(Expr::function(crate::FunctionName::Arcsin, Expr::zero()));
        let out = transform::apply(TransformGroup::Trig, "evaluate", &econ, &[]).unwrap();
        assert_eq!(out.isyms.len(), 1);
        assert_eq!(out.expr.uid(), econ.expr.uid());
        assert_eq!(crate::to_latex(&out).unwrap(), "\\left\\{ {n}\\pi \\right\\}_{n}");
    }
}
