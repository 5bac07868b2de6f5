//! Per-variant lowering of expressions into boxes.
//!
//! The math style is passed down explicitly; each call records the box it
//! produced for its node in the node map.

use std::sync::Arc;

use num_bigint::BigInt;
use rustc_hash::FxHashMap;

use super::fonts::FontName;
use super::make::{Boxes, delimiter_envelope};
use super::style::{MathStyle, Param};
use super::{BoxId, BoxKind};
use crate::core::{Constant, Expr, ExprKind, Paren, SymbolTable, Uid};
use crate::error::CasResult;

pub(super) struct Lowering<'a> {
    isyms: &'a SymbolTable,
    boxes: Boxes,
    node_boxes: FxHashMap<Uid, BoxId>,
}

impl<'a> Lowering<'a> {
    pub(super) fn new(isyms: &'a SymbolTable) -> Self {
        Self {
            isyms,
            boxes: Boxes::default(),
            node_boxes: FxHashMap::default(),
        }
    }

    pub(super) fn finish(self) -> (Boxes, FxHashMap<Uid, BoxId>) {
        (self.boxes, self.node_boxes)
    }

    pub(super) fn node(&mut self, expr: &Expr, style: MathStyle) -> CasResult<BoxId> {
        let mut id = self.node_inner(expr, style)?;
        if expr.paren() == Paren::On {
            id = self.boxes.delims(Some("("), id, Some(")"), style)?;
        }
        self.node_boxes.insert(expr.uid(), id);
        Ok(id)
    }

    fn node_inner(&mut self, expr: &Expr, style: MathStyle) -> CasResult<BoxId> {
        match &expr.kind {
            ExprKind::PlaceHolder => Ok(self.boxes.square(0.5, 0.5, 0.0, 0.1)),
            ExprKind::Symbol(suid) => {
                let name = &self.isyms.resolve(*suid)?.name;
                self.boxes.symbol(name, style)
            }
            ExprKind::Rational(r) => {
                if r.is_integer() {
                    return self.boxes.integer(&r.p, style);
                }
                let num = self.boxes.integer(&r.p, style.frac_num())?;
                let den = self.boxes.integer(&r.q, style.frac_den())?;
                Ok(self.boxes.fraction(num, den, style))
            }
            ExprKind::SpecialConstant(c) => match c {
                Constant::I => self.boxes.char("i", FontName::MathItalic, style),
                Constant::E => self.boxes.char("e", FontName::MathItalic, style),
                Constant::Pi => self.boxes.char("\\pi", FontName::MathItalic, style),
                Constant::Infinity => self.boxes.char("\\infty", FontName::MainRegular, style),
            },
            ExprKind::Fraction { num, den } => {
                let x = self.node(num, style.frac_num())?;
                let z = self.node(den, style.frac_den())?;
                Ok(self.boxes.fraction(x, z, style))
            }
            ExprKind::Derivative { func, indep, order } => {
                let num_style = style.frac_num();
                let d = self.boxes.char("d", FontName::MathItalic, num_style)?;
                let d = self.with_order(d, *order, num_style)?;
                let f = self.node(func, num_style)?;
                let num = self.boxes.hatom_list(&[d, f], num_style);

                let den_style = style.frac_den();
                let d = self.boxes.char("d", FontName::MathItalic, den_style)?;
                let x = self.node(indep, den_style)?;
                let x = self.with_order(x, *order, den_style)?;
                let den = self.boxes.hatom_list(&[d, x], den_style);
                Ok(self.boxes.fraction(num, den, style))
            }
            ExprKind::DefinedBy { left, right } => {
                let left = self.node(left, style)?;
                let colon = self.boxes.char(":", FontName::MainRegular, style)?;
                let eq = self.boxes.char("=", FontName::MainRegular, style)?;
                let right = self.node(right, style)?;
                Ok(self.boxes.hatom_list(&[left, colon, eq, right], style))
            }
            ExprKind::Add(subs) => self.join(subs, "+", style),
            ExprKind::Mul {
                subs,
                display_operator: true,
            } => self.join(subs, "\\times", style),
            ExprKind::Mul { subs, .. } => self.product(subs, style),
            ExprKind::LogicOp { op, subs } => self.join(subs, op.latex(), style),
            ExprKind::Pow { base, exp } => {
                let nucleus = self.node(base, style)?;
                if exp.is_half() {
                    let id = self.boxes.sqrt(nucleus, style)?;
                    self.node_boxes.insert(exp.uid(), id);
                    return Ok(id);
                }
                let sup = self.node(exp, style.sup())?;
                let nucleus = if (base.is_add() || base.is_mul()) && base.paren() == Paren::Auto {
                    self.wrap_parens(base, nucleus, style)?
                } else {
                    nucleus
                };
                Ok(self.boxes.sup(nucleus, sup, style))
            }
            ExprKind::Equal { left, right } => {
                self.join(&[Arc::clone(left), Arc::clone(right)], "=", style)
            }
            ExprKind::Compare { first, rest } => {
                let mut atoms = vec![self.node(first, style)?];
                for (rel, e) in rest {
                    atoms.push(self.boxes.char(rel.latex(), FontName::MainRegular, style)?);
                    atoms.push(self.node(e, style)?);
                }
                Ok(self.boxes.hatom_list(&atoms, style))
            }
            ExprKind::Cases(cases) => {
                let rows = cases
                    .iter()
                    .map(|case| -> CasResult<Vec<BoxId>> {
                        Ok(vec![self.node(&case.expr, style)?, self.node(&case.cond, style)?])
                    })
                    .collect::<CasResult<Vec<_>>>()?;
                let array = self.array(&rows, style);
                self.boxes.delims(Some("{"), array, None, style)
            }
            ExprKind::Matrix(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| row.iter().map(|e| self.node(e, style)).collect())
                    .collect::<CasResult<Vec<Vec<_>>>>()?;
                let array = self.array(&rows, style);
                self.boxes.delims(Some("["), array, Some("]"), style)
            }
            ExprKind::Group(subs) => {
                let members = subs
                    .iter()
                    .map(|e| self.node(e, style))
                    .collect::<CasResult<Vec<_>>>()?;
                let mut items = Vec::with_capacity(members.len());
                let mut y = 0.0;
                for &id in &members {
                    items.push((id, y));
                    let m = self.boxes.metric(id);
                    y += m.height + m.depth + 1.0;
                }
                let total = (y - 1.0).max(0.0);
                let a = style.param(Param::Sigma22);
                Ok(self.boxes.vlist_by_offset(total / 2.0 + a, total / 2.0 - a, &items))
            }
            ExprKind::SpecialFunction { name, arg } => {
                let letters = name
                    .name()
                    .chars()
                    .map(|c| self.boxes.char(c.encode_utf8(&mut [0; 4]), FontName::MainRegular, style))
                    .collect::<CasResult<Vec<_>>>()?;
                let f = self.boxes.hatom_list(&letters, style);
                let arg = self.node(arg, style)?;
                let arg = self.boxes.delims(Some("("), arg, Some(")"), style)?;
                Ok(self.boxes.hatom_list(&[f, arg], style))
            }
            ExprKind::InfiniteSequence { elem, index } => {
                let elem = self.node(elem, style)?;
                let name = &self.isyms.resolve(*index)?.name;
                let idx = self.boxes.symbol(name, style.sub())?;
                let braced = self.boxes.delims(Some("{"), elem, Some("}"), style)?;
                Ok(self.boxes.sub(braced, idx, style))
            }
            ExprKind::Norm(sub) => {
                let inner = self.node(sub, style)?;
                self.boxes.delims(Some("|"), inner, Some("|"), style)
            }
            ExprKind::ComplexConjugate(sub) => {
                let inner = self.node(sub, style)?;
                let star = self.boxes.char("*", FontName::MainRegular, style.sup())?;
                Ok(self.boxes.sup(inner, star, style))
            }
            ExprKind::Integral { integrand, var } => {
                let integrand = self.node(integrand, style)?;
                let var = self.node(var, style)?;
                let envelope = delimiter_envelope(self.boxes.metric(integrand), style);
                let op = self.boxes.delim("\\int", envelope, style)?;
                let d = self.boxes.char("d", FontName::MathItalic, style)?;
                Ok(self.boxes.hatom_list(&[op, integrand, d, var], style))
            }
        }
    }

    /// Attach `^order` to `nucleus` unless the order is 1
    fn with_order(&mut self, nucleus: BoxId, order: u32, style: MathStyle) -> CasResult<BoxId> {
        if order == 1 {
            return Ok(nucleus);
        }
        let exp = self.boxes.integer(&BigInt::from(order), style.sup())?;
        Ok(self.boxes.sup(nucleus, exp, style))
    }

    /// Parenthesize an operand and make it the node's box
    fn wrap_parens(&mut self, expr: &Expr, inner: BoxId, style: MathStyle) -> CasResult<BoxId> {
        let id = self.boxes.delims(Some("("), inner, Some(")"), style)?;
        self.node_boxes.insert(expr.uid(), id);
        Ok(id)
    }

    /// Operands interleaved with a separator glyph
    fn join(&mut self, subs: &[Arc<Expr>], separator: &str, style: MathStyle) -> CasResult<BoxId> {
        let mut atoms = Vec::with_capacity(2 * subs.len());
        for (i, sub) in subs.iter().enumerate() {
            if i > 0 {
                atoms.push(self.boxes.char(separator, FontName::MainRegular, style)?);
            }
            atoms.push(self.node(sub, style)?);
        }
        Ok(self.boxes.hatom_list(&atoms, style))
    }

    /// Juxtaposed factors. A leading unparenthesized -1 becomes a unary
    /// minus and sums are parenthesized.
    fn product(&mut self, subs: &[Arc<Expr>], style: MathStyle) -> CasResult<BoxId> {
        let mut atoms = Vec::with_capacity(subs.len());
        let mut rest = subs;
        if let [first, tail @ ..] = subs
            && !tail.is_empty()
            && first.is_neg_one()
            && first.paren() != Paren::On
        {
            let sign = self.boxes.char("-", FontName::MainRegular, style)?;
            self.node_boxes.insert(first.uid(), sign);
            atoms.push(sign);
            rest = tail;
        }
        for sub in rest {
            let mut id = self.node(sub, style)?;
            if sub.is_add() && sub.paren() == Paren::Auto {
                id = self.wrap_parens(sub, id, style)?;
            }
            atoms.push(id);
        }
        Ok(self.boxes.hatom_list(&atoms, style))
    }

    /// Rows of cells on a grid with unit column gaps, each row at least as
    /// tall as the array strut, centred on the math axis
    fn array(&mut self, rows: &[Vec<BoxId>], style: MathStyle) -> BoxId {
        let baselineskip = 1.2 * style.font_scale();
        let arrayskip = 1.2 * baselineskip;
        let strut_height = 0.7 * arrayskip;
        let strut_depth = 0.3 * arrayskip;

        let mut row_top = Vec::with_capacity(rows.len());
        let mut row_height = Vec::with_capacity(rows.len());
        let mut total = 0.0;
        for row in rows {
            let height = row
                .iter()
                .map(|&id| self.boxes.metric(id).height)
                .fold(strut_height, f64::max);
            let depth = row
                .iter()
                .map(|&id| self.boxes.metric(id).depth)
                .fold(strut_depth, f64::max);
            row_top.push(total);
            row_height.push(height);
            total += height + depth;
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut column_left = Vec::with_capacity(columns);
        let mut x = 0.0;
        for col in 0..columns {
            let width = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|&id| self.boxes.metric(id).width)
                .fold(0.0, f64::max);
            column_left.push(x);
            x += width + 1.0;
        }

        let mut items = Vec::with_capacity(rows.len());
        for (j, row) in rows.iter().enumerate() {
            let cells: Vec<(BoxId, f64)> = row.iter().copied().zip(column_left.iter().copied()).collect();
            let line = self.boxes.hlist_by_offset(&cells);
            let shift = row_height[j] - self.boxes.metric(line).height;
            let line = self.boxes.vshift(line, shift);
            items.push((line, row_top[j]));
        }
        let a = style.param(Param::Sigma22);
        let id = self.boxes.vlist_by_offset(total / 2.0 + a, total / 2.0 - a, &items);
        self.boxes.set_kind(id, BoxKind::Array);
        id
    }
}
