//! Box-model layout engine.
//!
//! Lowers an [`Econ`] into a tree of TeX boxes. Every box carries its height
//! and depth around a baseline plus its width, all in em. Child boxes are
//! positioned by the offset of their top-left corner inside the parent's
//! top-left corner, which is what a renderer and hit-testing need.
//!
//! Boxes live in a slot-map arena owned by the resulting [`Layout`], which
//! also records the box produced for every expression node.
//!
//! # Example
//! ```ignore
//! use texcas::{Econ, Expr, tex};
//!
//! let layout = tex::build(&Econ::bare(Expr::sqrt(Expr::integer(2))))?;
//! let root = layout.root_box();
//! println!("{} x {}", root.metric.width, root.metric.height + root.metric.depth);
//! ```

mod build;
pub mod fonts;
pub mod make;
pub mod style;

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::core::queries::validate_econ;
use crate::core::visitor::count_nodes;
use crate::core::{Econ, Uid};
use crate::error::CasResult;

pub use fonts::FontName;
pub use make::{DelimSize, find_delimiter};
pub use style::{AtomType, MathStyle, Param};

new_key_type! {
    /// Handle of a box in a [`Layout`]
    pub struct BoxId;
}

/// Dimensions of a box. Refer to TeXbook p. 63.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Metric {
    pub height: f64,
    pub depth: f64,
    pub width: f64,
    pub italic: f64,
    pub skew: f64,
}

impl Metric {
    pub fn new(height: f64, width: f64, depth: f64) -> Self {
        Self {
            height,
            depth,
            width,
            ..Default::default()
        }
    }

    fn scaled(self, scale: f64) -> Self {
        Self {
            height: self.height * scale,
            depth: self.depth * scale,
            width: self.width * scale,
            italic: self.italic * scale,
            skew: self.skew * scale,
        }
    }
}

/// Which construction produced a box
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxKind {
    Glyph,
    Rule,
    Square,
    HList,
    VList,
    Center,
    Shift,
    Scripts,
    Radical,
    Fraction,
    Delimited,
    Array,
}

/// A child placed inside its parent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Child {
    pub id: BoxId,
    /// Offset of the child's left edge from the parent's left edge
    pub x: f64,
    /// Offset of the child's top edge from the parent's top edge
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BoxContent {
    Glyph {
        code: char,
        font: FontName,
        /// Relative font size of the current style
        scale: f64,
    },
    /// Filled rectangle
    Rule,
    /// Outlined rectangle
    Square { stroke: f64 },
    Children(Vec<Child>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TexBox {
    pub metric: Metric,
    pub atom: AtomType,
    pub kind: BoxKind,
    pub content: BoxContent,
}

impl TexBox {
    pub fn children(&self) -> &[Child] {
        match &self.content {
            BoxContent::Children(children) => children,
            _ => &[],
        }
    }
}

/// Result of lowering one expression
#[derive(Debug)]
pub struct Layout {
    boxes: SlotMap<BoxId, TexBox>,
    root: BoxId,
    node_boxes: FxHashMap<Uid, BoxId>,
}

impl Layout {
    pub fn root(&self) -> BoxId {
        self.root
    }

    pub fn root_box(&self) -> &TexBox {
        &self.boxes[self.root]
    }

    pub fn get(&self, id: BoxId) -> Option<&TexBox> {
        self.boxes.get(id)
    }

    /// Box produced for the expression node with `uid`
    pub fn box_id_of(&self, uid: Uid) -> Option<BoxId> {
        self.node_boxes.get(&uid).copied()
    }

    pub fn box_of(&self, uid: Uid) -> Option<&TexBox> {
        self.box_id_of(uid).and_then(|id| self.boxes.get(id))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoxId, &TexBox)> {
        self.boxes.iter()
    }

    /// Absolute top-left corner of every box reachable from the root, with
    /// the root at `(0, 0)`
    pub fn placements(&self) -> FxHashMap<BoxId, (f64, f64)> {
        let mut out = FxHashMap::default();
        let mut stack = vec![(self.root, 0.0, 0.0)];
        while let Some((id, x, y)) = stack.pop() {
            out.insert(id, (x, y));
            if let Some(b) = self.boxes.get(id) {
                for child in b.children() {
                    stack.push((child.id, x + child.x, y + child.y));
                }
            }
        }
        out
    }
}

/// Lay out `econ` starting in display style
pub fn build(econ: &Econ) -> CasResult<Layout> {
    build_with_style(econ, MathStyle::Display)
}

/// Lay out `econ` starting in `style`. The tree is validated first.
pub fn build_with_style(econ: &Econ, style: MathStyle) -> CasResult<Layout> {
    validate_econ(econ)?;
    debug!(
        root = %econ.expr.uid(),
        nodes = count_nodes(&econ.expr),
        ?style,
        "building layout"
    );
    let mut lowering = build::Lowering::new(&econ.isyms);
    let root = lowering.node(&econ.expr, style)?;
    let (boxes, node_boxes) = lowering.finish();
    Ok(Layout {
        boxes: boxes.into_inner(),
        root,
        node_boxes,
    })
}
