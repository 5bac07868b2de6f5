//! Math styles, font parameters and inter-atom spacing (TeXbook appendix G).

/// The eight TeX math styles, ordered so that `D > Dc > T > Tc > S > Sc > SS > SSc`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MathStyle {
    ScriptScriptCramped,
    ScriptScript,
    ScriptCramped,
    Script,
    TextCramped,
    Text,
    DisplayCramped,
    Display,
}

use MathStyle::{
    Display as D, DisplayCramped as Dc, Script as S, ScriptCramped as Sc, ScriptScript as SS,
    ScriptScriptCramped as SSc, Text as T, TextCramped as Tc,
};

const SUP: [MathStyle; 8] = [SSc, SS, SSc, SS, Sc, S, Sc, S];
const SUB: [MathStyle; 8] = [SSc, SSc, SSc, SSc, Sc, Sc, Sc, Sc];
const FRAC_NUM: [MathStyle; 8] = [SSc, SS, SSc, SS, Sc, S, Tc, T];
const FRAC_DEN: [MathStyle; 8] = [SSc, SSc, SSc, SSc, Sc, Sc, Tc, Tc];
const CRAMP: [MathStyle; 8] = [SSc, SSc, Sc, Sc, Tc, Tc, Dc, Dc];
const FONT_SCALE: [f64; 8] = [0.5, 0.5, 0.7, 0.7, 1.0, 1.0, 1.0, 1.0];
const SIZE: [usize; 8] = [3, 3, 2, 2, 1, 1, 0, 0];

impl MathStyle {
    pub const ALL: [MathStyle; 8] = [SSc, SS, Sc, S, Tc, T, Dc, D];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Style of a superscript
    pub fn sup(self) -> MathStyle {
        SUP[self.index()]
    }

    /// Style of a subscript
    pub fn sub(self) -> MathStyle {
        SUB[self.index()]
    }

    pub fn frac_num(self) -> MathStyle {
        FRAC_NUM[self.index()]
    }

    pub fn frac_den(self) -> MathStyle {
        FRAC_DEN[self.index()]
    }

    pub fn cramped(self) -> MathStyle {
        CRAMP[self.index()]
    }

    pub fn is_cramped(self) -> bool {
        self.cramped() == self
    }

    /// Glyph scale relative to text size
    pub fn font_scale(self) -> f64 {
        FONT_SCALE[self.index()]
    }

    /// 0 for display, 3 for scriptscript
    pub fn size(self) -> usize {
        SIZE[self.index()]
    }

    /// Font parameter in em, scaled for this style
    pub fn param(self, p: Param) -> f64 {
        let (column, mul) = if self >= Tc {
            (0, 1.0)
        } else if self >= Sc {
            (1, 0.7)
        } else {
            (2, 0.5)
        };
        mul * p.values()[column]
    }
}

/// Font dimensions of the symbol (σ) and extension (ξ) families,
/// in text / script / scriptscript order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    /// x-height
    Sigma5,
    /// quad
    Sigma6,
    /// num1
    Sigma8,
    /// num2
    Sigma9,
    /// num3
    Sigma10,
    /// denom1
    Sigma11,
    /// denom2
    Sigma12,
    /// sup1
    Sigma13,
    /// sup2
    Sigma14,
    /// sup3
    Sigma15,
    /// sub1
    Sigma16,
    /// sub2
    Sigma17,
    /// sup drop
    Sigma18,
    /// sub drop
    Sigma19,
    Sigma20,
    Sigma21,
    /// axis height
    Sigma22,
    /// default rule thickness
    Xi8,
    Xi9,
    Xi10,
    Xi11,
    Xi12,
    Xi13,
    PtPerEm,
    /// `\scriptspace` = 0.5pt
    ScriptSpace,
}

impl Param {
    fn values(self) -> [f64; 3] {
        match self {
            Param::Sigma5 => [0.431, 0.431, 0.431],
            Param::Sigma6 => [1.0, 1.171, 1.472],
            Param::Sigma8 => [0.677, 0.732, 0.925],
            Param::Sigma9 => [0.394, 0.384, 0.387],
            Param::Sigma10 => [0.444, 0.471, 0.504],
            Param::Sigma11 => [0.686, 0.752, 1.025],
            Param::Sigma12 => [0.345, 0.344, 0.532],
            Param::Sigma13 => [0.413, 0.503, 0.504],
            Param::Sigma14 => [0.363, 0.431, 0.404],
            Param::Sigma15 => [0.289, 0.286, 0.294],
            Param::Sigma16 => [0.15, 0.143, 0.2],
            Param::Sigma17 => [0.247, 0.286, 0.4],
            Param::Sigma18 => [0.386, 0.353, 0.494],
            Param::Sigma19 => [0.05, 0.071, 0.1],
            Param::Sigma20 => [2.39, 1.7, 1.98],
            Param::Sigma21 => [1.01, 1.157, 1.42],
            Param::Sigma22 => [0.25, 0.25, 0.25],
            Param::Xi8 => [0.04, 0.049, 0.049],
            Param::Xi9 => [0.111, 0.111, 0.111],
            Param::Xi10 => [0.166, 0.166, 0.166],
            Param::Xi11 => [0.2, 0.2, 0.2],
            Param::Xi12 => [0.6, 0.611, 0.611],
            Param::Xi13 => [0.1, 0.143, 0.143],
            Param::PtPerEm => [10.0, 10.0, 10.0],
            Param::ScriptSpace => [0.05, 0.05, 0.05],
        }
    }
}

// =============================================================================
// ATOM SPACING
// =============================================================================

/// TeX atom classes governing inter-box spacing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomType {
    Ord,
    Op,
    Bin,
    Rel,
    Open,
    Close,
    Punct,
    Inner,
}

#[derive(Clone, Copy)]
enum Space {
    None,
    /// Thin/medium/thick in every style
    Always(u8),
    /// Only in display and text styles
    NonScript(u8),
}

const N: Space = Space::None;
const A1: Space = Space::Always(1);
const C1: Space = Space::NonScript(1);
const C2: Space = Space::NonScript(2);
const C3: Space = Space::NonScript(3);

// Rows are the left atom, columns the right atom; impossible pairs are `N`.
#[rustfmt::skip]
const SPACING: [[Space; 8]; 8] = [
    /* Ord   */ [N,  A1, C2, C3, N,  N,  N,  C1],
    /* Op    */ [A1, A1, N,  C3, N,  N,  N,  C1],
    /* Bin   */ [C2, C2, N,  N,  C2, N,  N,  C2],
    /* Rel   */ [C3, C3, N,  N,  C3, N,  N,  C3],
    /* Open  */ [N,  N,  N,  N,  N,  N,  N,  N ],
    /* Close */ [N,  A1, C2, C3, N,  N,  N,  C1],
    /* Punct */ [C1, C1, N,  C1, C1, C1, C1, C1],
    /* Inner */ [C1, A1, C2, C3, C1, N,  C1, C1],
];

impl AtomType {
    fn index(self) -> usize {
        self as usize
    }

    /// A Bin after one of these is read as an Ord
    pub fn demotes_following_bin(self) -> bool {
        matches!(
            self,
            AtomType::Bin | AtomType::Op | AtomType::Rel | AtomType::Open | AtomType::Punct
        )
    }
}

/// Glue between two adjacent atoms, in em
pub fn spacing_between(left: AtomType, right: AtomType, style: MathStyle) -> f64 {
    let mu = match SPACING[left.index()][right.index()] {
        Space::None => 0,
        Space::Always(k) => k,
        Space::NonScript(k) if style >= Tc => k,
        Space::NonScript(_) => 0,
    };
    if mu == 0 {
        return 0.0;
    }
    f64::from(mu + 2) / 18.0 * style.param(Param::Sigma6)
}
