//! Box constructors. Rule numbers refer to TeXbook appendix G (pp. 438-443).

use num_bigint::BigInt;
use slotmap::SlotMap;
use tracing::trace;

use super::fonts::{FontName, char_data, glyph_metric, symbol_font};
use super::style::{AtomType, MathStyle, Param, spacing_between};
use super::{BoxContent, BoxId, BoxKind, Child, Metric, TexBox};
use crate::error::{CasError, CasResult};

/// Size chosen for a delimiter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelimSize {
    /// The Main-Regular glyph at the given style
    Small(MathStyle),
    /// One of the Size1..Size4 fonts
    Large(u8),
    /// Extensible glyph
    Stack,
}

const NEVER_STACK: [DelimSize; 7] = [
    DelimSize::Small(MathStyle::ScriptScript),
    DelimSize::Small(MathStyle::Script),
    DelimSize::Small(MathStyle::Text),
    DelimSize::Large(1),
    DelimSize::Large(2),
    DelimSize::Large(3),
    DelimSize::Large(4),
];

const ALWAYS_STACK: [DelimSize; 4] = [
    DelimSize::Small(MathStyle::ScriptScript),
    DelimSize::Small(MathStyle::Script),
    DelimSize::Small(MathStyle::Text),
    DelimSize::Stack,
];

const STACK_LARGE: [DelimSize; 8] = [
    DelimSize::Small(MathStyle::ScriptScript),
    DelimSize::Small(MathStyle::Script),
    DelimSize::Small(MathStyle::Text),
    DelimSize::Large(1),
    DelimSize::Large(2),
    DelimSize::Large(3),
    DelimSize::Large(4),
    DelimSize::Stack,
];

fn delimiter_sequence(delim: &str) -> &'static [DelimSize] {
    match delim {
        "(" | "\\lparen" | ")" | "\\rparen" | "[" | "\\lbrack" | "]" | "\\rbrack" | "{" | "\\{"
        | "\\lbrace" | "}" | "\\}" | "\\rbrace" | "\\lfloor" | "\\rfloor" | "\\lceil"
        | "\\rceil" | "\\surd" => &STACK_LARGE,
        "<" | ">" | "\\langle" | "\\rangle" | "/" | "\\backslash" | "\\lt" | "\\gt" => {
            &NEVER_STACK
        }
        _ => &ALWAYS_STACK,
    }
}

fn font_of(size: DelimSize) -> FontName {
    match size {
        DelimSize::Small(_) => FontName::MainRegular,
        DelimSize::Large(n) => FontName::sized(n),
        DelimSize::Stack => FontName::Size4,
    }
}

fn missing(glyph: &str, font: FontName) -> CasError {
    CasError::MissingGlyph {
        glyph: glyph.to_string(),
        font: font.name(),
    }
}

/// Pick the first size in the delimiter's sequence whose glyph is taller
/// than `min_height_depth`, starting earlier in the sequence for smaller
/// styles. Falls back to the last entry of the sequence.
pub fn find_delimiter(
    delim: &str,
    min_height_depth: f64,
    style: MathStyle,
) -> CasResult<DelimSize> {
    let sequence = delimiter_sequence(delim);
    let code = char_data(delim)
        .ok_or_else(|| missing(delim, FontName::MainRegular))?
        .code;
    let start = 2.min(3 - style.size());
    for &candidate in &sequence[start..] {
        if candidate == DelimSize::Stack {
            break;
        }
        let font = font_of(candidate);
        let metric = glyph_metric(code, font).ok_or_else(|| missing(delim, font))?;
        let mut height_depth = metric.height + metric.depth;
        if let DelimSize::Small(_) = candidate {
            height_depth *= style.font_scale();
        }
        if height_depth > min_height_depth {
            trace!(delim, min_height_depth, ?candidate, "delimiter chosen");
            return Ok(candidate);
        }
    }
    let last = sequence[sequence.len() - 1];
    trace!(delim, min_height_depth, ?last, "delimiter sequence exhausted");
    Ok(last)
}

/// Minimum height plus depth of a delimiter around a box (rule 19)
pub fn delimiter_envelope(inner: Metric, style: MathStyle) -> f64 {
    let a = style.param(Param::Sigma22);
    let delta = (inner.height - a).max(inner.depth + a);
    (1.802 * delta).max(2.0 * delta - 5.0 / style.param(Param::PtPerEm))
}

/// Box arena used while lowering
#[derive(Debug, Default)]
pub(crate) struct Boxes(SlotMap<BoxId, TexBox>);

impl Boxes {
    pub fn into_inner(self) -> SlotMap<BoxId, TexBox> {
        self.0
    }

    fn alloc(&mut self, metric: Metric, atom: AtomType, kind: BoxKind, content: BoxContent) -> BoxId {
        self.0.insert(TexBox {
            metric,
            atom,
            kind,
            content,
        })
    }

    fn children(&mut self, metric: Metric, kind: BoxKind, children: Vec<Child>) -> BoxId {
        self.alloc(metric, AtomType::Ord, kind, BoxContent::Children(children))
    }

    pub fn metric(&self, id: BoxId) -> Metric {
        self.0.get(id).map(|b| b.metric).unwrap_or_default()
    }

    fn atom(&self, id: BoxId) -> AtomType {
        self.0.get(id).map_or(AtomType::Ord, |b| b.atom)
    }

    fn set_atom(&mut self, id: BoxId, atom: AtomType) {
        if let Some(b) = self.0.get_mut(id) {
            b.atom = atom;
        }
    }

    pub fn set_kind(&mut self, id: BoxId, kind: BoxKind) {
        if let Some(b) = self.0.get_mut(id) {
            b.kind = kind;
        }
    }

    fn set_vertical(&mut self, id: BoxId, height: f64, depth: f64) {
        if let Some(b) = self.0.get_mut(id) {
            b.metric.height = height;
            b.metric.depth = depth;
        }
    }

    // -------------------------------------------------------------------------
    // Leaves
    // -------------------------------------------------------------------------

    /// A glyph scaled to `style`
    pub fn char(&mut self, key: &str, font: FontName, style: MathStyle) -> CasResult<BoxId> {
        let data = char_data(key).ok_or_else(|| missing(key, font))?;
        let metric = glyph_metric(data.code, font).ok_or_else(|| missing(key, font))?;
        let scale = style.font_scale();
        Ok(self.alloc(
            metric.scaled(scale),
            data.atom,
            BoxKind::Glyph,
            BoxContent::Glyph {
                code: data.code,
                font,
                scale,
            },
        ))
    }

    /// Refer to TeXbook p. 219
    pub fn rule(&mut self, height: f64, width: f64, depth: f64) -> BoxId {
        self.alloc(
            Metric::new(height, width, depth),
            AtomType::Ord,
            BoxKind::Rule,
            BoxContent::Rule,
        )
    }

    pub fn square(&mut self, height: f64, width: f64, depth: f64, stroke: f64) -> BoxId {
        self.alloc(
            Metric::new(height, width, depth),
            AtomType::Ord,
            BoxKind::Square,
            BoxContent::Square { stroke },
        )
    }

    pub fn integer(&mut self, n: &BigInt, style: MathStyle) -> CasResult<BoxId> {
        let digits = n
            .to_string()
            .chars()
            .map(|c| self.char(c.encode_utf8(&mut [0; 4]), FontName::MainRegular, style))
            .collect::<CasResult<Vec<_>>>()?;
        Ok(self.hatom_list(&digits, style))
    }

    /// A symbol name, with an optional `_{...}` subscript
    pub fn symbol(&mut self, name: &str, style: MathStyle) -> CasResult<BoxId> {
        match name.split_once('_') {
            None => self.symbol_text(name, style),
            Some((nucleus, sub)) => {
                let sub = sub
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .unwrap_or(sub);
                let nucleus = self.symbol_text(nucleus, style)?;
                let sub = self.symbol_text(sub, style.sub())?;
                Ok(self.sub(nucleus, sub, style))
            }
        }
    }

    fn symbol_text(&mut self, text: &str, style: MathStyle) -> CasResult<BoxId> {
        if let Some(data) = char_data(text) {
            return self.char(text, symbol_font(data.code), style);
        }
        if text.starts_with('\\') || text.is_empty() {
            return Err(missing(text, FontName::MathItalic));
        }
        let chars = text
            .chars()
            .map(|c| self.symbol_text(c.encode_utf8(&mut [0; 4]), style))
            .collect::<CasResult<Vec<_>>>()?;
        Ok(self.hatom_list(&chars, style))
    }

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------

    /// Children side by side, aligned on the baseline
    pub fn hlist_by_offset(&mut self, items: &[(BoxId, f64)]) -> BoxId {
        let mut metric = Metric::default();
        for &(id, offset) in items {
            let m = self.metric(id);
            metric.height = metric.height.max(m.height);
            metric.depth = metric.depth.max(m.depth);
            metric.width = offset + m.width;
        }
        let children = items
            .iter()
            .map(|&(id, x)| Child {
                id,
                x,
                y: metric.height - self.metric(id).height,
            })
            .collect();
        self.children(metric, BoxKind::HList, children)
    }

    /// Children stacked at the given top offsets, aligned on the left
    pub fn vlist_by_offset(&mut self, height: f64, depth: f64, items: &[(BoxId, f64)]) -> BoxId {
        let width = items
            .iter()
            .map(|&(id, _)| self.metric(id).width)
            .fold(0.0, f64::max);
        let children = items.iter().map(|&(id, y)| Child { id, x: 0.0, y }).collect();
        self.children(Metric::new(height, width, depth), BoxKind::VList, children)
    }

    /// Atoms joined with inter-atom glue (rule 5); a Bin that cannot be
    /// binary becomes an Ord
    pub fn hatom_list(&mut self, ids: &[BoxId], style: MathStyle) -> BoxId {
        let Some((&first, rest)) = ids.split_first() else {
            return self.hlist_by_offset(&[]);
        };
        if self.atom(first) == AtomType::Bin {
            self.set_atom(first, AtomType::Ord);
        }
        let mut items = vec![(first, 0.0)];
        let mut offset = self.metric(first).width;
        let mut previous = first;
        for &id in rest {
            if self.atom(previous).demotes_following_bin() && self.atom(id) == AtomType::Bin {
                self.set_atom(id, AtomType::Ord);
            }
            offset += spacing_between(self.atom(previous), self.atom(id), style);
            items.push((id, offset));
            offset += self.metric(id).width;
            previous = id;
        }
        self.hlist_by_offset(&items)
    }

    /// `inner` horizontally centred in a box of `width`
    pub fn center(&mut self, inner: BoxId, width: f64) -> BoxId {
        let m = self.metric(inner);
        let child = Child {
            id: inner,
            x: (width - m.width) / 2.0,
            y: 0.0,
        };
        self.children(Metric { width, ..m }, BoxKind::Center, vec![child])
    }

    /// Move `inner` down by `offset`
    pub fn vshift(&mut self, inner: BoxId, offset: f64) -> BoxId {
        let m = self.metric(inner);
        let atom = self.atom(inner);
        let id = self.children(
            Metric {
                height: m.height + offset,
                ..m
            },
            BoxKind::Shift,
            vec![Child {
                id: inner,
                x: 0.0,
                y: offset,
            }],
        );
        self.set_atom(id, atom);
        id
    }

    // -------------------------------------------------------------------------
    // Scripts (rules 17, 18)
    // -------------------------------------------------------------------------

    /// Superscript `x` on `nucleus` (rules 18a, 18c, 18d)
    pub fn sup(&mut self, nucleus: BoxId, x: BoxId, style: MathStyle) -> BoxId {
        let n = self.metric(nucleus);
        let xm = self.metric(x);
        let nucleus_width = n.width + n.italic;
        let u = n.height - style.param(Param::Sigma18);

        let p = if style == MathStyle::Display {
            style.param(Param::Sigma13)
        } else if style.is_cramped() {
            style.param(Param::Sigma15)
        } else {
            style.param(Param::Sigma14)
        };
        let shift_up = u
            .max(p)
            .max(xm.depth + style.param(Param::Sigma5).abs() / 4.0);

        let height = n.height.max(xm.height + shift_up);
        let metric = Metric::new(height, nucleus_width + xm.width, n.depth);
        let children = vec![
            Child {
                id: nucleus,
                x: 0.0,
                y: height - n.height,
            },
            Child {
                id: x,
                x: nucleus_width,
                y: height - shift_up - xm.height,
            },
        ];
        self.children(metric, BoxKind::Scripts, children)
    }

    /// Subscript `x` on `nucleus` (rules 18a, 18b)
    pub fn sub(&mut self, nucleus: BoxId, x: BoxId, style: MathStyle) -> BoxId {
        let n = self.metric(nucleus);
        let xm = self.metric(x);
        let nucleus_width = n.width + n.italic;
        let v = n.depth - style.param(Param::Sigma19);

        let shift_down = v
            .max(style.param(Param::Sigma16))
            .max(xm.height - 4.0 / 5.0 * style.param(Param::Sigma5).abs());
        let metric = Metric::new(
            n.height,
            nucleus_width + xm.width + style.param(Param::ScriptSpace),
            n.depth.max(xm.depth + shift_down),
        );
        let children = vec![
            Child {
                id: nucleus,
                x: 0.0,
                y: 0.0,
            },
            Child {
                id: x,
                x: nucleus_width,
                y: n.height + shift_down - xm.height,
            },
        ];
        self.children(metric, BoxKind::Scripts, children)
    }

    // -------------------------------------------------------------------------
    // Radicals and fractions (rules 11, 15)
    // -------------------------------------------------------------------------

    pub fn sqrt(&mut self, nucleus: BoxId, style: MathStyle) -> CasResult<BoxId> {
        let n = self.metric(nucleus);
        let theta = style.param(Param::Xi8);
        let phi = if style > MathStyle::Text {
            style.param(Param::Sigma5)
        } else {
            theta
        };
        let mut psi = theta + phi.abs() / 4.0;

        let delim = self.delim("\\surd", n.height + n.depth + psi + theta, style)?;
        let rule = self.rule(theta, n.width, 0.0);

        let d = self.metric(delim);
        let excess = d.height + d.depth - n.height - n.depth - psi;
        if excess > 0.0 {
            psi += excess / 2.0;
        }
        let height = theta + psi + n.height;
        let depth = d.height + d.depth - height;
        self.set_vertical(delim, height, depth);

        let body = self.vlist_by_offset(height, depth, &[(rule, 0.0), (nucleus, theta + psi)]);
        let id = self.hatom_list(&[delim, body], style);
        self.set_kind(id, BoxKind::Radical);
        Ok(id)
    }

    /// Numerator `x` over denominator `z`, both already laid out in the
    /// numerator/denominator styles of `style`
    pub fn fraction(&mut self, x: BoxId, z: BoxId, style: MathStyle) -> BoxId {
        let theta = style.param(Param::Xi8);
        let width = self.metric(x).width.max(self.metric(z).width);
        let x = self.center(x, width);
        let z = self.center(z, width);
        let (xm, zm) = (self.metric(x), self.metric(z));

        // 15b; 15c does not apply since the bar is never empty
        let (mut u, mut v) = if style > MathStyle::Text {
            (style.param(Param::Sigma8), style.param(Param::Sigma11))
        } else {
            (style.param(Param::Sigma9), style.param(Param::Sigma12))
        };

        // 15d
        let varphi = if style > MathStyle::Text {
            3.0 * theta
        } else {
            theta
        };
        let a = style.param(Param::Sigma22);

        // 15e
        let clearance = u - xm.depth - (a + theta / 2.0);
        if clearance < varphi {
            u += varphi - clearance;
        }
        let clearance = a - theta / 2.0 - (zm.height - v);
        if clearance < varphi {
            v += varphi - clearance;
        }

        let height = xm.height + u;
        let depth = zm.depth + v;
        let bar = self.rule(theta, width, 0.0);
        let mid_shift = a - theta / 2.0;

        let id = self.vlist_by_offset(
            height,
            depth,
            &[
                (x, height - u - xm.height),
                (bar, height - mid_shift - theta),
                (z, height + v - zm.height),
            ],
        );
        self.set_kind(id, BoxKind::Fraction);
        self.set_atom(id, AtomType::Inner);
        id
    }

    // -------------------------------------------------------------------------
    // Delimiters (rule 19)
    // -------------------------------------------------------------------------

    /// A delimiter at least `min_height_depth` tall, centred on the axis
    pub fn delim(&mut self, delim: &str, min_height_depth: f64, style: MathStyle) -> CasResult<BoxId> {
        let id = match find_delimiter(delim, min_height_depth, style)? {
            DelimSize::Small(_) => self.char(delim, FontName::MainRegular, style)?,
            DelimSize::Large(n) => self.char(delim, FontName::sized(n), MathStyle::Display)?,
            DelimSize::Stack => self.char(delim, FontName::Size4, style)?,
        };
        let a = style.param(Param::Sigma22);
        let m = self.metric(id);
        let half = (m.height + m.depth) / 2.0;
        self.set_vertical(id, half + a, half - a);
        Ok(id)
    }

    /// `inner` between a left and a right delimiter, either of which may be absent
    pub fn delims(
        &mut self,
        left: Option<&str>,
        inner: BoxId,
        right: Option<&str>,
        style: MathStyle,
    ) -> CasResult<BoxId> {
        let envelope = delimiter_envelope(self.metric(inner), style);
        let mut atoms = Vec::with_capacity(3);
        if let Some(left) = left {
            atoms.push(self.delim(left, envelope, style)?);
        }
        atoms.push(inner);
        if let Some(right) = right {
            atoms.push(self.delim(right, envelope, style)?);
        }
        let id = self.hatom_list(&atoms, style);
        self.set_kind(id, BoxKind::Delimited);
        Ok(id)
    }
}
