//! Cell fills, borders and color resolution.
//!
//! Colors in `styles.xml` are stored as absolute ARGB values, as indexes into the
//! legacy 64-entry palette or as theme slots with a tint. Everything is resolved
//! against a [`Palette`] while the sheet is snapshotted, so geometric code only
//! ever compares plain 8-hex-digit strings.

use serde::Serialize;

/// Resolved color of a cell without any fill.
pub const NO_FILL: &str = "00000000";

/// Default legacy palette (`indexed="0"` .. `indexed="63"`), RGB only.
const INDEXED_COLORS: [&str; 64] = [
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF",
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF",
    "800000", "008000", "000080", "808000", "800080", "008080", "C0C0C0", "808080",
    "9999FF", "993366", "FFFFCC", "CCFFFF", "660066", "FF8080", "0066CC", "CCCCFF",
    "000080", "FF00FF", "FFFF00", "00FFFF", "800080", "800000", "008080", "0000FF",
    "00CCFF", "CCFFFF", "CCFFCC", "FFFF99", "99CCFF", "FF99CC", "CC99FF", "FFCC99",
    "3366FF", "33CCCC", "99CC00", "FFCC00", "FF9900", "FF6600", "666699", "969696",
    "003366", "339966", "003300", "333300", "993300", "993366", "333399", "333333",
];

/// Theme color scheme slots in the order they appear in `theme1.xml`.
pub(crate) const THEME_SLOTS: [&str; 12] = [
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink",
];

/// A color reference as written in the workbook.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum ColorSpec {
    /// No color attribute at all (`auto` or missing)
    #[default]
    Auto,
    Rgb(String),
    Theme { index: usize, tint: f64 },
    Indexed(usize),
}

/// Fill of a cell format before palette resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum FillSpec {
    #[default]
    None,
    Pattern(ColorSpec),
    /// Gradient fills have no single color
    Unsupported,
}

/// Visible border edges of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Borders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Borders {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self { top: true, bottom: true, left: true, right: true }
    }
}

/// Palette used to turn color references into absolute ARGB strings.
#[derive(Clone, Debug)]
pub struct Palette {
    /// RGB per theme index, already in Excel's index order (lt1, dk1, lt2, dk2, ...)
    theme: Vec<Option<String>>,
    indexed: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            theme: Vec::new(),
            indexed: INDEXED_COLORS.iter().map(|rgb| rgb.to_string()).collect(),
        }
    }
}

impl Palette {
    /// Builds a palette from the theme color scheme (in file order, see [`THEME_SLOTS`])
    /// and the optional custom `<indexedColors>` list of `styles.xml`.
    pub(crate) fn new(scheme: Vec<Option<String>>, indexed: Vec<String>) -> Self {
        let mut theme = scheme;
        // Excel addresses the first four scheme slots with light/dark swapped
        if theme.len() >= 4 {
            theme.swap(0, 1);
            theme.swap(2, 3);
        }
        let indexed = if indexed.is_empty() {
            INDEXED_COLORS.iter().map(|rgb| rgb.to_string()).collect()
        } else {
            indexed
                .iter()
                .map(|argb| normalize_rgb(argb).get(2..).unwrap_or_default().to_string())
                .collect()
        };
        Self { theme, indexed }
    }

    /// Resolves a fill to an 8-hex ARGB string, [`NO_FILL`] when there is none and
    /// an empty string when the representation cannot be resolved.
    pub(crate) fn resolve_fill(&self, fill: &FillSpec) -> String {
        match fill {
            FillSpec::None => NO_FILL.to_owned(),
            FillSpec::Pattern(color) => self.resolve(color),
            FillSpec::Unsupported => String::new(),
        }
    }

    /// Resolves a color reference to an 8-hex ARGB string, empty when unresolvable.
    pub(crate) fn resolve(&self, color: &ColorSpec) -> String {
        match color {
            ColorSpec::Auto => String::new(),
            ColorSpec::Rgb(rgb) => normalize_rgb(rgb),
            ColorSpec::Indexed(64) | ColorSpec::Indexed(65) => NO_FILL.to_owned(),
            ColorSpec::Indexed(index) => self.indexed
                .get(*index)
                .filter(|rgb| !rgb.is_empty())
                .map(|rgb| format!("FF{rgb}"))
                .unwrap_or_default(),
            ColorSpec::Theme { index, tint } => self.theme
                .get(*index)
                .and_then(|rgb| rgb.as_deref())
                .and_then(parse_rgb)
                .map(|rgb| apply_tint(rgb, *tint))
                .map(|(r, g, b)| format!("FF{r:02X}{g:02X}{b:02X}"))
                .unwrap_or_default(),
        }
    }
}

/// Normalizes an `rgb` attribute to 8 upper-case hex digits; malformed values become empty.
pub(crate) fn normalize_rgb(value: &str) -> String {
    let value = value.trim().trim_start_matches('#');
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return String::new();
    }
    match value.len() {
        8 => value.to_ascii_uppercase(),
        6 => format!("FF{}", value.to_ascii_uppercase()),
        _ => String::new(),
    }
}

fn parse_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let argb = normalize_rgb(value);
    if argb.is_empty() {
        return None;
    }
    let channel = |offset: usize| u8::from_str_radix(&argb[offset..offset + 2], 16).ok();
    Some((channel(2)?, channel(4)?, channel(6)?))
}

/// Applies an OOXML tint (-1.0 darkens to black, 1.0 lightens to white) in HLS space.
pub(crate) fn apply_tint(rgb: (u8, u8, u8), tint: f64) -> (u8, u8, u8) {
    if tint == 0.0 {
        return rgb;
    }
    let (h, l, s) = rgb_to_hls(rgb);
    let l = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        l * (1.0 - tint) + tint
    };
    hls_to_rgb(h, l.clamp(0.0, 1.0), s)
}

fn rgb_to_hls((r, g, b): (u8, u8, u8)) -> (f64, f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, l, 0.0);
    }
    let delta = max - min;
    let s = if l <= 0.5 { delta / (max + min) } else { delta / (2.0 - max - min) };
    let h = if max == r {
        (g - b) / delta
    } else if max == g {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    ((h / 6.0).rem_euclid(1.0), l, s)
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (u8, u8, u8) {
    let to_byte = |value: f64| (value * 255.0).round().clamp(0.0, 255.0) as u8;
    if s == 0.0 {
        return (to_byte(l), to_byte(l), to_byte(l));
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    let channel = |hue: f64| {
        let hue = hue.rem_euclid(1.0);
        if hue < 1.0 / 6.0 {
            m1 + (m2 - m1) * hue * 6.0
        } else if hue < 0.5 {
            m2
        } else if hue < 2.0 / 3.0 {
            m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
        } else {
            m1
        }
    };
    (
        to_byte(channel(h + 1.0 / 3.0)),
        to_byte(channel(h)),
        to_byte(channel(h - 1.0 / 3.0)),
    )
}
