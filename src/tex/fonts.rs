//! Glyph registry: control sequences, atom classes and per-font metrics.
//!
//! Metrics are `[depth, height, italic, skew, width]` in em at text size,
//! taken from the KaTeX/Computer Modern tables for the glyphs the layout
//! engine emits.

use super::Metric;
use super::style::AtomType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontName {
    MainRegular,
    MathItalic,
    AmsRegular,
    Size1,
    Size2,
    Size3,
    Size4,
}

impl FontName {
    pub fn name(self) -> &'static str {
        match self {
            FontName::MainRegular => "Main-Regular",
            FontName::MathItalic => "Math-Italic",
            FontName::AmsRegular => "AMS-Regular",
            FontName::Size1 => "Size1-Regular",
            FontName::Size2 => "Size2-Regular",
            FontName::Size3 => "Size3-Regular",
            FontName::Size4 => "Size4-Regular",
        }
    }

    /// Font of a large delimiter of the given size (1..=4)
    pub fn sized(size: u8) -> FontName {
        match size {
            1 => FontName::Size1,
            2 => FontName::Size2,
            3 => FontName::Size3,
            _ => FontName::Size4,
        }
    }
}

/// What a literal or control sequence stands for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharData {
    pub code: char,
    pub atom: AtomType,
}

/// Look up a single-character literal (`a`, `7`, `+`) or a control sequence
/// (`\pi`, `\le`, `\surd`)
pub fn char_data(key: &str) -> Option<CharData> {
    use AtomType::*;

    let (code, atom) = match key {
        "\\alpha" => ('α', Ord),
        "\\beta" => ('β', Ord),
        "\\gamma" => ('γ', Ord),
        "\\delta" => ('δ', Ord),
        "\\epsilon" => ('ϵ', Ord),
        "\\zeta" => ('ζ', Ord),
        "\\eta" => ('η', Ord),
        "\\theta" => ('θ', Ord),
        "\\iota" => ('ι', Ord),
        "\\kappa" => ('κ', Ord),
        "\\lambda" => ('λ', Ord),
        "\\mu" => ('μ', Ord),
        "\\nu" => ('ν', Ord),
        "\\xi" => ('ξ', Ord),
        "\\omicron" => ('ο', Ord),
        "\\pi" => ('π', Ord),
        "\\rho" => ('ρ', Ord),
        "\\sigma" => ('σ', Ord),
        "\\tau" => ('τ', Ord),
        "\\upsilon" => ('υ', Ord),
        "\\phi" => ('ϕ', Ord),
        "\\chi" => ('χ', Ord),
        "\\psi" => ('ψ', Ord),
        "\\omega" => ('ω', Ord),
        "\\varepsilon" => ('ε', Ord),
        "\\vartheta" => ('ϑ', Ord),
        "\\varpi" => ('ϖ', Ord),
        "\\varrho" => ('ϱ', Ord),
        "\\varsigma" => ('ς', Ord),
        "\\varphi" => ('φ', Ord),
        "\\hbar" => ('ℏ', Ord),
        "\\infty" => ('∞', Ord),
        "\\neg" => ('¬', Ord),
        "\\forall" => ('∀', Ord),
        "\\exists" => ('∃', Ord),
        "\\square" => ('□', Ord),

        "*" => ('∗', Bin),
        "+" => ('+', Bin),
        "-" => ('−', Bin),
        "\\times" => ('×', Bin),
        "\\div" => ('÷', Bin),
        "\\land" => ('∧', Bin),
        "\\lor" => ('∨', Bin),

        ":" => (':', Rel),
        "=" => ('=', Rel),
        "\\le" => ('≤', Rel),
        "\\ge" => ('≥', Rel),
        "<" | "\\lt" => ('<', Rel),
        ">" | "\\gt" => ('>', Rel),
        "\\in" => ('∈', Rel),
        "\\subseteq" => ('⊆', Rel),
        "\\Rightarrow" => ('⇒', Rel),
        "\\Longrightarrow" => ('⟹', Rel),
        "\\Leftrightarrow" => ('⇔', Rel),
        "\\Longleftrightarrow" => ('⟺', Rel),

        "," => (',', Punct),

        "(" | "\\lparen" => ('(', Open),
        ")" | "\\rparen" => (')', Close),
        "[" | "\\lbrack" => ('[', Open),
        "]" | "\\rbrack" => (']', Close),
        "{" | "\\{" | "\\lbrace" => ('{', Open),
        "}" | "\\}" | "\\rbrace" => ('}', Close),
        "|" => ('|', Ord),
        "\\surd" => ('√', Ord),
        "\\int" => ('∫', Op),

        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() || is_greek(c) => (c, Ord),
                _ => return None,
            }
        }
    };
    Some(CharData { code, atom })
}

fn is_greek(c: char) -> bool {
    ('α'..='ω').contains(&c) || matches!(c, 'ϑ' | 'ϕ' | 'ϖ' | 'ϱ' | 'ϵ')
}

/// Font a symbol glyph is set in: letters in math italic, everything else
/// upright
pub fn symbol_font(code: char) -> FontName {
    match code {
        c if c.is_ascii_alphabetic() || is_greek(c) => FontName::MathItalic,
        '□' => FontName::AmsRegular,
        _ => FontName::MainRegular,
    }
}

type Raw = [f64; 5];

const DIGIT: Raw = [0.0, 0.64444, 0.0, 0.0, 0.5];
const PAREN: Raw = [0.25, 0.75, 0.0, 0.0, 0.38889];
const BRACKET: Raw = [0.25, 0.75, 0.0, 0.0, 0.27778];
const BRACE: Raw = [0.25, 0.75, 0.0, 0.0, 0.5];
const BIN: Raw = [0.08333, 0.58333, 0.0, 0.0, 0.77778];
const LEQ: Raw = [0.13597, 0.63597, 0.0, 0.0, 0.77778];
const LESS: Raw = [0.0391, 0.5391, 0.0, 0.0, 0.77778];
const WEDGE: Raw = [0.0, 0.55556, 0.0, 0.0, 0.66667];

fn main_regular(code: char) -> Option<Raw> {
    Some(match code {
        '0'..='9' => DIGIT,
        '(' | ')' => PAREN,
        '[' | ']' => BRACKET,
        '{' | '}' => BRACE,
        '|' => [0.25, 0.75, 0.0, 0.0, 0.27778],
        '+' | '−' | '×' => BIN,
        '=' => [-0.13313, 0.36687, 0.0, 0.0, 0.77778],
        ':' => [0.0, 0.43056, 0.0, 0.0, 0.27778],
        ',' => [0.19444, 0.10556, 0.0, 0.0, 0.27778],
        '≤' | '≥' => LEQ,
        '<' | '>' => LESS,
        '∧' | '∨' => WEDGE,
        '∗' => [-0.03472, 0.46528, 0.0, 0.0, 0.5],
        '√' => [0.2, 0.8, 0.0, 0.0, 0.83334],
        '∞' => [0.0, 0.43056, 0.0, 0.0, 1.0],
        '∫' => [0.19444, 0.69444, 0.11111, 0.0, 0.41667],
        'ℏ' => [0.0, 0.68889, 0.0, 0.0, 0.54028],
        '¬' => [0.0, 0.43056, 0.0, 0.0, 0.66667],
        '÷' => BIN,
        '∈' => [0.0391, 0.5391, 0.0, 0.0, 0.66667],
        '⊆' => LEQ,
        '∀' | '∃' => [0.0, 0.69444, 0.0, 0.0, 0.55556],
        '⇒' | '⇔' => [-0.13313, 0.36687, 0.0, 0.0, 1.0],
        '⟹' => [0.024, 0.525, 0.0, 0.0, 1.63889],
        '⟺' => [0.024, 0.525, 0.0, 0.0, 1.85834],
        'a' => [0.0, 0.43056, 0.0, 0.0, 0.5],
        'b' => [0.0, 0.69444, 0.0, 0.0, 0.55556],
        'c' => [0.0, 0.43056, 0.0, 0.0, 0.44445],
        'd' => [0.0, 0.69444, 0.0, 0.0, 0.55556],
        'e' => [0.0, 0.43056, 0.0, 0.0, 0.44445],
        'f' => [0.0, 0.69444, 0.07778, 0.0, 0.30556],
        'g' => [0.19444, 0.43056, 0.01389, 0.0, 0.5],
        'h' => [0.0, 0.69444, 0.0, 0.0, 0.55556],
        'i' => [0.0, 0.66786, 0.0, 0.0, 0.27778],
        'j' => [0.19444, 0.66786, 0.0, 0.0, 0.30556],
        'k' => [0.0, 0.69444, 0.0, 0.0, 0.52778],
        'l' => [0.0, 0.69444, 0.0, 0.0, 0.27778],
        'm' => [0.0, 0.43056, 0.0, 0.0, 0.83334],
        'n' => [0.0, 0.43056, 0.0, 0.0, 0.55556],
        'o' => [0.0, 0.43056, 0.0, 0.0, 0.5],
        'p' => [0.19444, 0.43056, 0.0, 0.0, 0.55556],
        'q' => [0.19444, 0.43056, 0.0, 0.0, 0.52778],
        'r' => [0.0, 0.43056, 0.0, 0.0, 0.39167],
        's' => [0.0, 0.43056, 0.0, 0.0, 0.39445],
        't' => [0.0, 0.61508, 0.0, 0.0, 0.38889],
        'u' => [0.0, 0.43056, 0.0, 0.0, 0.55556],
        'v' => [0.0, 0.43056, 0.01389, 0.0, 0.52778],
        'w' => [0.0, 0.43056, 0.01389, 0.0, 0.72222],
        'x' => [0.0, 0.43056, 0.0, 0.0, 0.52778],
        'y' => [0.19444, 0.43056, 0.01389, 0.0, 0.52778],
        'z' => [0.0, 0.43056, 0.0, 0.0, 0.44445],
        _ => return None,
    })
}

fn math_italic(code: char) -> Option<Raw> {
    Some(match code {
        'A' => [0.0, 0.68333, 0.0, 0.13889, 0.75],
        'B' => [0.0, 0.68333, 0.05017, 0.08334, 0.75851],
        'C' => [0.0, 0.68333, 0.07153, 0.08334, 0.71472],
        'D' => [0.0, 0.68333, 0.02778, 0.05556, 0.82792],
        'E' => [0.0, 0.68333, 0.05764, 0.08334, 0.7382],
        'F' => [0.0, 0.68333, 0.13889, 0.08334, 0.64306],
        'G' => [0.0, 0.68333, 0.0, 0.08334, 0.78625],
        'H' => [0.0, 0.68333, 0.08125, 0.05556, 0.83125],
        'I' => [0.0, 0.68333, 0.07847, 0.11111, 0.43958],
        'J' => [0.0, 0.68333, 0.09618, 0.16667, 0.55451],
        'K' => [0.0, 0.68333, 0.07153, 0.05556, 0.84931],
        'L' => [0.0, 0.68333, 0.0, 0.02778, 0.68056],
        'M' => [0.0, 0.68333, 0.10903, 0.08334, 0.97014],
        'N' => [0.0, 0.68333, 0.10903, 0.08334, 0.80347],
        'O' => [0.0, 0.68333, 0.02778, 0.08334, 0.76278],
        'P' => [0.0, 0.68333, 0.13889, 0.08334, 0.64201],
        'Q' => [0.19444, 0.68333, 0.0, 0.08334, 0.79056],
        'R' => [0.0, 0.68333, 0.00773, 0.08334, 0.75929],
        'S' => [0.0, 0.68333, 0.05764, 0.08334, 0.6132],
        'T' => [0.0, 0.68333, 0.13889, 0.08334, 0.58438],
        'U' => [0.0, 0.68333, 0.10903, 0.02778, 0.68278],
        'V' => [0.0, 0.68333, 0.22222, 0.0, 0.58333],
        'W' => [0.0, 0.68333, 0.13889, 0.0, 0.94445],
        'X' => [0.0, 0.68333, 0.07847, 0.08334, 0.82847],
        'Y' => [0.0, 0.68333, 0.22222, 0.0, 0.58056],
        'Z' => [0.0, 0.68333, 0.07153, 0.08334, 0.68264],
        'a' => [0.0, 0.43056, 0.0, 0.0, 0.52859],
        'b' => [0.0, 0.69444, 0.0, 0.0, 0.42917],
        'c' => [0.0, 0.43056, 0.0, 0.05556, 0.43276],
        'd' => [0.0, 0.69444, 0.0, 0.16667, 0.52049],
        'e' => [0.0, 0.43056, 0.0, 0.05556, 0.46563],
        'f' => [0.19444, 0.69444, 0.10764, 0.16667, 0.48959],
        'g' => [0.19444, 0.43056, 0.03588, 0.02778, 0.47697],
        'h' => [0.0, 0.69444, 0.0, 0.0, 0.57616],
        'i' => [0.0, 0.65952, 0.0, 0.0, 0.34451],
        'j' => [0.19444, 0.65952, 0.05724, 0.0, 0.41181],
        'k' => [0.0, 0.69444, 0.03148, 0.0, 0.5206],
        'l' => [0.0, 0.69444, 0.01968, 0.08334, 0.29838],
        'm' => [0.0, 0.43056, 0.0, 0.0, 0.87801],
        'n' => [0.0, 0.43056, 0.0, 0.0, 0.60023],
        'o' => [0.0, 0.43056, 0.0, 0.05556, 0.48472],
        'p' => [0.19444, 0.43056, 0.0, 0.08334, 0.50313],
        'q' => [0.19444, 0.43056, 0.03588, 0.08334, 0.44641],
        'r' => [0.0, 0.43056, 0.02778, 0.05556, 0.45116],
        's' => [0.0, 0.43056, 0.0, 0.05556, 0.46875],
        't' => [0.0, 0.61508, 0.0, 0.08334, 0.36111],
        'u' => [0.0, 0.43056, 0.0, 0.02778, 0.57246],
        'v' => [0.0, 0.43056, 0.03588, 0.02778, 0.48472],
        'w' => [0.0, 0.43056, 0.02691, 0.08334, 0.71592],
        'x' => [0.0, 0.43056, 0.0, 0.02778, 0.57153],
        'y' => [0.19444, 0.43056, 0.03588, 0.05556, 0.49028],
        'z' => [0.0, 0.43056, 0.04398, 0.05556, 0.46505],
        'α' => [0.0, 0.43056, 0.0037, 0.02778, 0.6397],
        'β' => [0.19444, 0.69444, 0.05278, 0.08334, 0.56563],
        'γ' => [0.19444, 0.43056, 0.05556, 0.0, 0.51773],
        'δ' => [0.0, 0.69444, 0.03785, 0.05556, 0.44444],
        'ε' => [0.0, 0.43056, 0.0, 0.08334, 0.46632],
        'ζ' => [0.19444, 0.69444, 0.07378, 0.08334, 0.4375],
        'η' => [0.19444, 0.43056, 0.03588, 0.05556, 0.49653],
        'θ' => [0.0, 0.69444, 0.02778, 0.08334, 0.46944],
        'ι' => [0.0, 0.43056, 0.0, 0.05556, 0.35394],
        'κ' => [0.0, 0.43056, 0.0, 0.0, 0.57616],
        'λ' => [0.0, 0.69444, 0.0, 0.0, 0.58333],
        'μ' => [0.19444, 0.43056, 0.0, 0.02778, 0.60255],
        'ν' => [0.0, 0.43056, 0.06366, 0.02778, 0.49398],
        'ξ' => [0.19444, 0.69444, 0.04601, 0.11111, 0.43819],
        'ο' => [0.0, 0.43056, 0.0, 0.05556, 0.48472],
        'π' => [0.0, 0.43056, 0.03588, 0.0, 0.57031],
        'ρ' | 'ϱ' => [0.19444, 0.43056, 0.0, 0.08334, 0.51702],
        'ς' => [0.09722, 0.43056, 0.07986, 0.08334, 0.36285],
        'σ' => [0.0, 0.43056, 0.03588, 0.0, 0.57141],
        'τ' => [0.0, 0.43056, 0.1132, 0.02778, 0.43715],
        'υ' => [0.0, 0.43056, 0.03588, 0.02778, 0.54028],
        'φ' => [0.19444, 0.43056, 0.0, 0.08334, 0.65417],
        'χ' => [0.19444, 0.43056, 0.0, 0.05556, 0.62569],
        'ψ' => [0.19444, 0.69444, 0.03588, 0.11111, 0.65139],
        'ω' => [0.0, 0.43056, 0.03588, 0.0, 0.62245],
        'ϑ' => [0.0, 0.69444, 0.0, 0.08334, 0.59144],
        'ϕ' => [0.19444, 0.69444, 0.0, 0.08334, 0.59618],
        'ϖ' => [0.0, 0.43056, 0.02778, 0.0, 0.82813],
        'ϵ' => [0.0, 0.43056, 0.0, 0.05556, 0.4059],
        _ => return None,
    })
}

fn ams_regular(code: char) -> Option<Raw> {
    match code {
        '□' => Some([0.0, 0.675, 0.0, 0.0, 0.77778]),
        _ => None,
    }
}

/// Extensible delimiters in the four large sizes
fn sized(size: usize, code: char) -> Option<Raw> {
    // (depth, height) per size, shared by the bracket shapes
    const DH: [(f64, f64); 4] = [
        (0.35001, 0.85),
        (0.65002, 1.15),
        (0.95003, 1.45),
        (1.25003, 1.75),
    ];
    let (depth, height) = DH[size - 1];
    let width = match code {
        '(' | ')' => [0.45834, 0.59722, 0.73611, 0.79167][size - 1],
        '[' | ']' => [0.41667, 0.47222, 0.52778, 0.58334][size - 1],
        '{' | '}' => [0.58334, 0.66667, 0.75, 0.80556][size - 1],
        '<' | '>' => [0.47222, 0.52778, 0.52778, 0.80556][size - 1],
        '√' => 1.0,
        '|' if size == 4 => 0.33334,
        '∫' => {
            return match size {
                1 => Some([0.30612, 0.805, 0.19445, 0.0, 0.47222]),
                2 | 4 => Some([0.86225, 1.36, 0.44445, 0.0, 0.55556]),
                _ => None,
            };
        }
        _ => return None,
    };
    Some([depth, height, 0.0, 0.0, width])
}

/// Unscaled metrics of `code` in `font`
pub fn glyph_metric(code: char, font: FontName) -> Option<Metric> {
    let raw = match font {
        FontName::MainRegular => main_regular(code),
        FontName::MathItalic => math_italic(code),
        FontName::AmsRegular => ams_regular(code),
        FontName::Size1 => sized(1, code),
        FontName::Size2 => sized(2, code),
        FontName::Size3 => sized(3, code),
        FontName::Size4 => sized(4, code),
    }?;
    let [depth, height, italic, skew, width] = raw;
    Some(Metric {
        height,
        depth,
        width,
        italic,
        skew,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_sequences() {
        let le = char_data("\\le").unwrap();
        assert_eq!(le.code, '≤');
        assert_eq!(le.atom, AtomType::Rel);
        assert_eq!(char_data("-").unwrap().code, '−');
        assert_eq!(char_data("x").unwrap().atom, AtomType::Ord);
        assert!(char_data("\\unknown").is_none());
        assert!(char_data("xy").is_none());
    }

    #[test]
    fn test_delimiter_sizes_grow() {
        let sizes: Vec<f64> = [FontName::Size1, FontName::Size2, FontName::Size3, FontName::Size4]
            .into_iter()
            .map(|f| {
                let m = glyph_metric('(', f).unwrap();
                m.height + m.depth
            })
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_symbol_fonts() {
        assert_eq!(symbol_font('x'), FontName::MathItalic);
        assert_eq!(symbol_font('ρ'), FontName::MathItalic);
        assert_eq!(symbol_font('ϑ'), FontName::MathItalic);
        assert_eq!(symbol_font('7'), FontName::MainRegular);
        assert_eq!(symbol_font('∀'), FontName::MainRegular);
        assert_eq!(symbol_font('□'), FontName::AmsRegular);

        let implies = char_data("\\Rightarrow").unwrap();
        assert_eq!(implies.atom, AtomType::Rel);
        assert!(glyph_metric(implies.code, FontName::MainRegular).is_some());
        assert!(glyph_metric('□', FontName::AmsRegular).is_some());
    }

    #[test]
    fn test_italic_pi() {
        let m = glyph_metric('π', FontName::MathItalic).unwrap();
        assert_eq!(m.width, 0.57031);
        assert!(glyph_metric('π', FontName::Size1).is_none());
    }
}
