//! Expression constructors.
//!
//! Every variant has a raw constructor taking an explicit [`Uid`] (`*_at`),
//! used to keep a rewritten node's identity, and a fresh constructor that
//! mints a new uid for newly introduced subexpressions.

use std::sync::Arc;

use num_bigint::BigInt;

use super::{Case, Constant, Expr, ExprKind, FunctionName, LogicOperator, Paren, Relation, Uid, next_uid};
use crate::core::rational::Rational;
use crate::core::symbol::Suid;

pub(crate) fn arcs<I, E>(subs: I) -> Vec<Arc<Expr>>
where
    I: IntoIterator<Item = E>,
    E: Into<Arc<Expr>>,
{
    subs.into_iter().map(Into::into).collect()
}

impl Expr {
    /// Raw node with explicit uid and automatic parenthesis
    pub fn from_parts(uid: Uid, kind: ExprKind) -> Expr {
        Expr {
            uid,
            paren: Paren::Auto,
            kind,
        }
    }

    /// Fresh node
    pub fn new(kind: ExprKind) -> Expr {
        Expr::from_parts(next_uid(), kind)
    }

    // =========================================================================
    // Raw constructors
    // =========================================================================

    pub fn placeholder_at(uid: Uid) -> Expr {
        Expr::from_parts(uid, ExprKind::PlaceHolder)
    }

    pub fn symbol_at(uid: Uid, suid: Suid) -> Expr {
        Expr::from_parts(uid, ExprKind::Symbol(suid))
    }

    pub fn rational_at(uid: Uid, value: Rational) -> Expr {
        Expr::from_parts(uid, ExprKind::Rational(value))
    }

    pub fn constant_at(uid: Uid, c: Constant) -> Expr {
        Expr::from_parts(uid, ExprKind::SpecialConstant(c))
    }

    pub fn function_at(uid: Uid, name: FunctionName, arg: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::SpecialFunction {
                name,
                arg: arg.into(),
            },
        )
    }

    pub fn add_at<I, E>(uid: Uid, subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::from_parts(uid, ExprKind::Add(arcs(subs)))
    }

    pub fn mul_at<I, E>(uid: Uid, subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::from_parts(
            uid,
            ExprKind::Mul {
                subs: arcs(subs),
                display_operator: false,
            },
        )
    }

    pub fn pow_at(uid: Uid, base: impl Into<Arc<Expr>>, exp: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::Pow {
                base: base.into(),
                exp: exp.into(),
            },
        )
    }

    pub fn fraction_at(uid: Uid, num: impl Into<Arc<Expr>>, den: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::Fraction {
                num: num.into(),
                den: den.into(),
            },
        )
    }

    pub fn derivative_at(
        uid: Uid,
        func: impl Into<Arc<Expr>>,
        indep: impl Into<Arc<Expr>>,
        order: u32,
    ) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::Derivative {
                func: func.into(),
                indep: indep.into(),
                order,
            },
        )
    }

    pub fn defined_by_at(uid: Uid, left: impl Into<Arc<Expr>>, right: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::DefinedBy {
                left: left.into(),
                right: right.into(),
            },
        )
    }

    pub fn cases_at<I, E, C>(uid: Uid, cases: I) -> Expr
    where
        I: IntoIterator<Item = (E, C)>,
        E: Into<Arc<Expr>>,
        C: Into<Arc<Expr>>,
    {
        Expr::from_parts(
            uid,
            ExprKind::Cases(
                cases
                    .into_iter()
                    .map(|(expr, cond)| Case {
                        expr: expr.into(),
                        cond: cond.into(),
                    })
                    .collect(),
            ),
        )
    }

    pub fn equal_at(uid: Uid, left: impl Into<Arc<Expr>>, right: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::Equal {
                left: left.into(),
                right: right.into(),
            },
        )
    }

    pub fn group_at<I, E>(uid: Uid, subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::from_parts(uid, ExprKind::Group(arcs(subs)))
    }

    pub fn logic_at<I, E>(uid: Uid, op: LogicOperator, subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::from_parts(
            uid,
            ExprKind::LogicOp {
                op,
                subs: arcs(subs),
            },
        )
    }

    pub fn compare_at<I, E>(uid: Uid, first: impl Into<Arc<Expr>>, rest: I) -> Expr
    where
        I: IntoIterator<Item = (Relation, E)>,
        E: Into<Arc<Expr>>,
    {
        Expr::from_parts(
            uid,
            ExprKind::Compare {
                first: first.into(),
                rest: rest.into_iter().map(|(op, e)| (op, e.into())).collect(),
            },
        )
    }

    pub fn matrix_at<R, I, E>(uid: Uid, rows: R) -> Expr
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::from_parts(uid, ExprKind::Matrix(rows.into_iter().map(arcs).collect()))
    }

    pub fn norm_at(uid: Uid, sub: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(uid, ExprKind::Norm(sub.into()))
    }

    pub fn conjugate_at(uid: Uid, sub: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(uid, ExprKind::ComplexConjugate(sub.into()))
    }

    pub fn integral_at(uid: Uid, integrand: impl Into<Arc<Expr>>, var: impl Into<Arc<Expr>>) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::Integral {
                integrand: integrand.into(),
                var: var.into(),
            },
        )
    }

    pub fn sequence_at(uid: Uid, elem: impl Into<Arc<Expr>>, index: Suid) -> Expr {
        Expr::from_parts(
            uid,
            ExprKind::InfiniteSequence {
                elem: elem.into(),
                index,
            },
        )
    }

    // =========================================================================
    // Fresh constructors
    // =========================================================================

    pub fn placeholder() -> Expr {
        Expr::placeholder_at(next_uid())
    }

    pub fn symbol(suid: Suid) -> Expr {
        Expr::symbol_at(next_uid(), suid)
    }

    pub fn rational(p: impl Into<BigInt>, q: impl Into<BigInt>) -> Expr {
        Expr::rational_at(next_uid(), Rational::new(p, q))
    }

    pub fn from_rational(value: Rational) -> Expr {
        Expr::rational_at(next_uid(), value)
    }

    pub fn integer(n: impl Into<BigInt>) -> Expr {
        Expr::rational(n, 1)
    }

    pub fn zero() -> Expr {
        Expr::integer(0)
    }

    pub fn one() -> Expr {
        Expr::integer(1)
    }

    pub fn neg_one() -> Expr {
        Expr::integer(-1)
    }

    pub fn constant(c: Constant) -> Expr {
        Expr::constant_at(next_uid(), c)
    }

    pub fn i() -> Expr {
        Expr::constant(Constant::I)
    }

    pub fn e() -> Expr {
        Expr::constant(Constant::E)
    }

    pub fn pi() -> Expr {
        Expr::constant(Constant::Pi)
    }

    pub fn function(name: FunctionName, arg: impl Into<Arc<Expr>>) -> Expr {
        Expr::function_at(next_uid(), name, arg)
    }

    pub fn add<I, E>(subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::add_at(next_uid(), subs)
    }

    /// `a + (-1)·b`
    pub fn minus(a: impl Into<Arc<Expr>>, b: impl Into<Arc<Expr>>) -> Expr {
        let negated = Expr::mul([Arc::new(Expr::neg_one()), b.into()]);
        Expr::add([a.into(), Arc::new(negated)])
    }

    pub fn mul<I, E>(subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::mul_at(next_uid(), subs)
    }

    /// Mul rendered with an explicit `×`
    pub fn times<I, E>(subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::new(ExprKind::Mul {
            subs: arcs(subs),
            display_operator: true,
        })
    }

    pub fn pow(base: impl Into<Arc<Expr>>, exp: impl Into<Arc<Expr>>) -> Expr {
        Expr::pow_at(next_uid(), base, exp)
    }

    /// `base^(1/2)`
    pub fn sqrt(base: impl Into<Arc<Expr>>) -> Expr {
        Expr::pow(base, Expr::rational(1, 2))
    }

    /// `base^(-1)`
    pub fn inverse(base: impl Into<Arc<Expr>>) -> Expr {
        Expr::pow(base, Expr::neg_one())
    }

    pub fn fraction(num: impl Into<Arc<Expr>>, den: impl Into<Arc<Expr>>) -> Expr {
        Expr::fraction_at(next_uid(), num, den)
    }

    pub fn derivative(func: impl Into<Arc<Expr>>, indep: impl Into<Arc<Expr>>, order: u32) -> Expr {
        Expr::derivative_at(next_uid(), func, indep, order)
    }

    pub fn defined_by(left: impl Into<Arc<Expr>>, right: impl Into<Arc<Expr>>) -> Expr {
        Expr::defined_by_at(next_uid(), left, right)
    }

    pub fn cases<I, E, C>(cases: I) -> Expr
    where
        I: IntoIterator<Item = (E, C)>,
        E: Into<Arc<Expr>>,
        C: Into<Arc<Expr>>,
    {
        Expr::cases_at(next_uid(), cases)
    }

    pub fn equal(left: impl Into<Arc<Expr>>, right: impl Into<Arc<Expr>>) -> Expr {
        Expr::equal_at(next_uid(), left, right)
    }

    pub fn group<I, E>(subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::group_at(next_uid(), subs)
    }

    pub fn logic<I, E>(op: LogicOperator, subs: I) -> Expr
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::logic_at(next_uid(), op, subs)
    }

    pub fn compare<I, E>(first: impl Into<Arc<Expr>>, rest: I) -> Expr
    where
        I: IntoIterator<Item = (Relation, E)>,
        E: Into<Arc<Expr>>,
    {
        Expr::compare_at(next_uid(), first, rest)
    }

    pub fn matrix<R, I, E>(rows: R) -> Expr
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = E>,
        E: Into<Arc<Expr>>,
    {
        Expr::matrix_at(next_uid(), rows)
    }

    pub fn norm(sub: impl Into<Arc<Expr>>) -> Expr {
        Expr::norm_at(next_uid(), sub)
    }

    pub fn conjugate(sub: impl Into<Arc<Expr>>) -> Expr {
        Expr::conjugate_at(next_uid(), sub)
    }

    pub fn integral(integrand: impl Into<Arc<Expr>>, var: impl Into<Arc<Expr>>) -> Expr {
        Expr::integral_at(next_uid(), integrand, var)
    }

    pub fn sequence(elem: impl Into<Arc<Expr>>, index: Suid) -> Expr {
        Expr::sequence_at(next_uid(), elem, index)
    }
}
