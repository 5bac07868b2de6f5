//! LaTeX export.
//!
//! A string backend parallel to the box layout, with the same variant
//! coverage and the same implicit parenthesization rules (sums inside
//! products, sums and products under a power).

use std::fmt;

use crate::core::{Econ, Expr, ExprKind, Paren, SymbolTable};
use crate::error::CasResult;

/// Render an expression as LaTeX
pub fn to_latex(econ: &Econ) -> CasResult<String> {
    latex(&econ.expr, &econ.isyms)
}

fn latex(expr: &Expr, isyms: &SymbolTable) -> CasResult<String> {
    let tex = latex_bare(expr, isyms)?;
    Ok(match expr.paren() {
        Paren::On => parens(&tex),
        Paren::Auto | Paren::Off => tex,
    })
}

fn parens(tex: &str) -> String {
    format!("\\left({tex}\\right)")
}

fn join(subs: &[std::sync::Arc<Expr>], sep: &str, isyms: &SymbolTable) -> CasResult<String> {
    Ok(subs
        .iter()
        .map(|s| latex(s, isyms))
        .collect::<CasResult<Vec<_>>>()?
        .join(sep))
}

fn latex_bare(expr: &Expr, isyms: &SymbolTable) -> CasResult<String> {
    let out = match &expr.kind {
        ExprKind::PlaceHolder => "\\square".to_string(),
        ExprKind::Symbol(suid) => format!("{{{}}}", isyms.resolve(*suid)?.name),
        ExprKind::Rational(r) => {
            if r.is_integer() {
                r.p.to_string()
            } else {
                format!("\\frac{{{}}}{{{}}}", r.p, r.q)
            }
        }
        ExprKind::SpecialConstant(c) => match c {
            crate::core::Constant::Pi | crate::core::Constant::Infinity => {
                format!("\\{}", c.name())
            }
            _ => c.name().to_string(),
        },
        ExprKind::SpecialFunction { name, arg } => format!(
            "\\mathop {{\\rm {}}}\\nolimits \\left({}\\right)",
            name.name(),
            latex(arg, isyms)?
        ),
        ExprKind::Add(subs) => join(subs, "+", isyms)?,
        ExprKind::Mul {
            subs,
            display_operator: true,
        } => join(subs, "\\times ", isyms)?,
        ExprKind::Mul { subs, .. } => {
            let mut tex = String::new();
            let mut rest = subs.as_slice();
            if let [first, tail @ ..] = rest
                && !tail.is_empty()
                && first.is_neg_one()
                && first.paren() != Paren::On
            {
                tex.push('-');
                rest = tail;
            }
            for sub in rest {
                let t = latex(sub, isyms)?;
                if sub.is_add() && sub.paren() == Paren::Auto {
                    tex.push_str(&parens(&t));
                } else {
                    tex.push_str(&t);
                }
            }
            tex
        }
        ExprKind::Pow { base, exp } => {
            if exp.is_half() {
                format!("\\sqrt{{{}}}", latex(base, isyms)?)
            } else {
                let mut b = latex(base, isyms)?;
                if (base.is_add() || base.is_mul()) && base.paren() == Paren::Auto {
                    b = parens(&b);
                }
                format!("{{{b}}}^{{{}}}", latex(exp, isyms)?)
            }
        }
        ExprKind::Fraction { num, den } => {
            format!("\\frac{{{}}}{{{}}}", latex(num, isyms)?, latex(den, isyms)?)
        }
        ExprKind::Derivative { func, indep, order } => {
            let o = if *order > 1 {
                format!("^{order}")
            } else {
                String::new()
            };
            format!(
                "\\frac{{d{o}{}}}{{d{}{o}}}",
                latex(func, isyms)?,
                latex(indep, isyms)?
            )
        }
        ExprKind::DefinedBy { left, right } => {
            format!("{}:={}", latex(left, isyms)?, latex(right, isyms)?)
        }
        ExprKind::Cases(cases) => {
            let rows = cases
                .iter()
                .map(|c| -> CasResult<String> {
                    Ok(format!("{}&{}", latex(&c.expr, isyms)?, latex(&c.cond, isyms)?))
                })
                .collect::<CasResult<Vec<_>>>()?;
            format!("\\begin{{cases}}{}\\end{{cases}}", rows.join("\\\\"))
        }
        ExprKind::Equal { left, right } => {
            format!("{}={}", latex(left, isyms)?, latex(right, isyms)?)
        }
        ExprKind::Group(subs) => join(subs, "\\\\", isyms)?,
        ExprKind::LogicOp { op, subs } => join(subs, &format!("{} ", op.latex()), isyms)?,
        ExprKind::Compare { first, rest } => {
            let mut tex = latex(first, isyms)?;
            for (rel, e) in rest {
                tex.push_str(rel.latex());
                tex.push(' ');
                tex.push_str(&latex(e, isyms)?);
            }
            tex
        }
        ExprKind::Matrix(rows) => {
            let rows = rows
                .iter()
                .map(|row| join(row, "&", isyms))
                .collect::<CasResult<Vec<_>>>()?;
            format!("\\begin{{bmatrix}}{}\\end{{bmatrix}}", rows.join("\\\\"))
        }
        ExprKind::Norm(sub) => format!("\\left|{}\\right|", latex(sub, isyms)?),
        ExprKind::ComplexConjugate(sub) => format!("{{{}}}^*", latex(sub, isyms)?),
        ExprKind::Integral { integrand, var } => {
            format!("\\int{}\\ d{}", latex(integrand, isyms)?, latex(var, isyms)?)
        }
        ExprKind::InfiniteSequence { elem, index } => format!(
            "\\left\\{{ {} \\right\\}}_{{{}}}",
            latex(elem, isyms)?,
            isyms.resolve(*index)?.name
        ),
    };
    Ok(out)
}

impl fmt::Display for Econ {
    /// LaTeX of the expression; an unresolved symbol is shown as an error marker
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match to_latex(self) {
            Ok(tex) => f.write_str(&tex),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}
