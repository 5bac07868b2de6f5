use crate::core::edits::{clone_expr, coeff_of, edit_tree, replace_node, replace_symbol_node};
use crate::core::queries::{
    find_all_at_depth, find_all_at_height, find_all_of_kind, find_by_uid, find_same_nodes,
    max_depth, path_to, referenced_symbols, st_eq, validate_econ, validate_tree,
};
use crate::core::visitor::count_nodes;
use crate::{CasError, Econ, Expr, ExprKind, ISym, NodeKind, Paren, SymbolTable, TreeError};

fn xy() -> (SymbolTable, Expr, Expr) {
    let mut isyms = SymbolTable::new();
    let x = isyms.push(ISym::real("x"));
    let y = isyms.push(ISym::real("y"));
    (isyms, Expr::symbol(x), Expr::symbol(y))
}

#[test]
fn test_st_eq_ignores_uid_and_parens() {
    let (_, x, _) = xy();
    let a = Expr::add([x.clone(), Expr::one()]);
    let b = Expr::add([clone_expr(&x), Expr::one()]).with_paren(Paren::On);
    assert_ne!(a.uid(), b.uid());
    assert!(st_eq(&a, &b));
    assert_eq!(a, b);
}

#[test]
fn test_st_eq_is_literal() {
    let (_, x, y) = xy();
    // No commutativity and no rational canonicalization
    let xy_sum = Expr::add([x.clone(), y.clone()]);
    let yx_sum = Expr::add([y, x]);
    assert!(!st_eq(&xy_sum, &yx_sum));
    assert!(!st_eq(&Expr::rational(2, 4), &Expr::rational(1, 2)));
    assert!(!st_eq(&Expr::add([Expr::one()]), &Expr::mul([Expr::one()])));
}

#[test]
fn test_depth_and_height() {
    let (_, x, _) = xy();
    let two = Expr::integer(2);
    let three = Expr::integer(3);
    let mul = Expr::mul([two.clone(), x.clone()]);
    let sum = Expr::add([mul.clone(), three.clone()]);

    assert_eq!(max_depth(&sum), 3);
    assert_eq!(max_depth(&x), 1);

    let depth1: Vec<_> = find_all_at_depth(&sum, 1).iter().map(|n| n.uid()).collect();
    assert_eq!(depth1, vec![mul.uid(), three.uid()]);
    assert_eq!(find_all_at_depth(&sum, 0)[0].uid(), sum.uid());
    assert!(find_all_at_depth(&sum, 5).is_empty());

    let leaves: Vec<_> = find_all_at_height(&sum, 0).iter().map(|n| n.uid()).collect();
    assert_eq!(leaves, vec![two.uid(), x.uid(), three.uid()]);
    let h1: Vec<_> = find_all_at_height(&sum, 1).iter().map(|n| n.uid()).collect();
    assert_eq!(h1, vec![mul.uid()]);
    let h2: Vec<_> = find_all_at_height(&sum, 2).iter().map(|n| n.uid()).collect();
    assert_eq!(h2, vec![sum.uid()]);
    assert!(find_all_at_height(&sum, 3).is_empty());
}

#[test]
fn test_find_same_nodes_excludes_the_probe() {
    let (_, x, y) = xy();
    let first = Expr::mul([x.clone(), y.clone()]);
    let second = clone_expr(&first);
    let sum = Expr::add([first.clone(), Expr::one(), second.clone()]);

    let same: Vec<_> = find_same_nodes(&sum, &first).iter().map(|n| n.uid()).collect();
    assert_eq!(same, vec![second.uid()]);
}

#[test]
fn test_path_and_lookup() {
    let (_, x, _) = xy();
    let pow = Expr::pow(x.clone(), Expr::integer(2));
    let sum = Expr::add([Expr::one(), pow.clone()]);

    let path: Vec<_> = path_to(&sum, x.uid()).unwrap().iter().map(|n| n.uid()).collect();
    assert_eq!(path, vec![sum.uid(), pow.uid(), x.uid()]);
    assert_eq!(
        find_by_uid(&sum, pow.uid()).map(|n| n.node_kind()),
        Some(NodeKind::Pow)
    );
    assert!(path_to(&sum, Expr::zero().uid()).is_none());
    assert_eq!(find_all_of_kind(&sum, NodeKind::Rational).len(), 2);
}

#[test]
fn test_clone_expr_mints_fresh_uids() {
    let (_, x, y) = xy();
    let expr = Expr::fraction(Expr::add([x, Expr::one()]), y);
    let copy = clone_expr(&expr);
    assert!(st_eq(&expr, &copy));
    let original: Vec<_> = crate::core::queries::flatten_pre_order(&expr)
        .iter()
        .map(|n| n.uid())
        .collect();
    for node in crate::core::queries::flatten_pre_order(&copy) {
        assert!(!original.contains(&node.uid()));
    }
}

#[test]
fn test_replace_node_keeps_off_path_uids() {
    let (_, x, y) = xy();
    let left = Expr::mul([x.clone(), y.clone()]);
    let right = Expr::pow(y.clone(), Expr::integer(2));
    let sum = Expr::add([left.clone(), right.clone()]);

    let by = Expr::integer(7);
    let out = replace_node(&sum, x.uid(), &by);
    assert_eq!(out.uid(), sum.uid());
    let subs = out.subs().unwrap();
    assert_eq!(subs[0].uid(), left.uid());
    assert_eq!(subs[1].uid(), right.uid());
    assert!(std::sync::Arc::ptr_eq(&subs[1], &sum.subs().unwrap()[1]));
    assert_eq!(subs[0].subs().unwrap()[0].uid(), by.uid());
    assert_eq!(subs[0].subs().unwrap()[1].uid(), y.uid());
}

#[test]
fn test_replace_symbol_node_and_edit_tree() {
    let (_, x, y) = xy();
    let ExprKind::Symbol(sx) = *x.kind() else {
        panic!("expected a symbol");
    };
    let expr = Expr::add([x.clone(), y.clone(), x.clone().with_uid(crate::core::next_uid())]);
    let out = replace_symbol_node(&expr, sx, Expr::zero);
    assert_eq!(find_all_of_kind(&out, NodeKind::Rational).len(), 2);

    let mut visited = 0;
    let same = edit_tree(&expr, &mut |node| {
        visited += 1;
        node
    });
    assert_eq!(visited, count_nodes(&expr));
    assert_eq!(same.uid(), expr.uid());
    assert!(st_eq(&same, &expr));
}

#[test]
fn test_coeff_of() {
    let (_, x, y) = xy();
    let term = Expr::mul([Expr::integer(3), x.clone(), y.clone()]);
    let c = coeff_of(&term, &x);
    assert!(st_eq(&c, &Expr::mul([Expr::integer(3), y.clone()])));
    assert!(coeff_of(&x, &x).is_one());
    assert!(coeff_of(&y, &x).is_zero());
}

#[test]
fn test_validate_tree_rejects_duplicate_uids() {
    let (_, x, _) = xy();
    let shared = Expr::add([x.clone(), x.clone()]);
    assert_eq!(validate_tree(&shared), Err(TreeError::DuplicateUid(x.uid())));

    let ragged = Expr::matrix([vec![Expr::one(), Expr::zero()], vec![Expr::one()]]);
    assert!(matches!(
        validate_tree(&ragged),
        Err(TreeError::RaggedMatrix { row: 1, expected: 2, found: 1, .. })
    ));
    let empty: Vec<Expr> = Vec::new();
    assert!(matches!(
        validate_tree(&Expr::add(empty)),
        Err(TreeError::EmptySubs { .. })
    ));
}

#[test]
fn test_validate_econ_resolves_symbols() {
    let (isyms, x, y) = xy();
    let econ = Econ::new(Expr::add([x, y]), isyms);
    assert!(validate_econ(&econ).is_ok());
    assert_eq!(referenced_symbols(&econ.expr).len(), 2);

    let stray = ISym::real("z");
    let bad = econ.with_expr(Expr::add([stray.to_expr(), Expr::one()]));
    assert!(matches!(
        validate_econ(&bad),
        Err(CasError::InvalidTree(TreeError::DanglingSymbol { .. }))
    ));
}
