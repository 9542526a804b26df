//! Color tables and palette reasoning.
//!
//! The neutral palette and the warm/cool hue families are constant tables.
//! A color can sit in more than one: navy is both neutral and cool, brown
//! and beige are both neutral and warm. Comparisons are case-insensitive;
//! a missing color is treated as neutral.

/// Neutral palette.
pub const NEUTRALS: &[&str] = &[
    "black", "white", "gray", "grey", "navy", "beige", "cream", "brown", "tan",
];

/// Warm hue family.
pub const WARM: &[&str] = &["red", "orange", "yellow", "brown", "beige"];

/// Cool hue family.
pub const COOL: &[&str] = &["blue", "navy", "green", "teal", "purple"];

/// Warm/cool assignment of a color, where it has one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HueFamily {
    Warm,
    Cool,
}

pub fn is_neutral(color: &str) -> bool {
    let lower = color.trim().to_lowercase();
    lower.is_empty() || NEUTRALS.contains(&lower.as_str())
}

pub fn hue_family(color: &str) -> Option<HueFamily> {
    let lower = color.trim().to_lowercase();
    if WARM.contains(&lower.as_str()) {
        Some(HueFamily::Warm)
    } else if COOL.contains(&lower.as_str()) {
        Some(HueFamily::Cool)
    } else {
        None
    }
}

/// True when the two colors form an accent pair: opposite hue families
/// (warm vs cool).
pub fn is_accent_pair(a: &str, b: &str) -> bool {
    match (hue_family(a), hue_family(b)) {
        (Some(fa), Some(fb)) => fa != fb,
        _ => false,
    }
}

/// True when the two colors share a hue family.
pub fn same_family(a: &str, b: &str) -> bool {
    match (hue_family(a), hue_family(b)) {
        (Some(fa), Some(fb)) => fa == fb,
        _ => false,
    }
}

// =============================================================================
// Color Strategies
// =============================================================================

/// Synthetic color-dimension buckets, all relative to the anchor's primary
/// color (except Neutral, which stands on its own).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorStrategy {
    Monochrome,
    Neutral,
    Accent,
    Tonal,
}

impl ColorStrategy {
    pub const ALL: [ColorStrategy; 4] = [
        ColorStrategy::Monochrome,
        ColorStrategy::Neutral,
        ColorStrategy::Accent,
        ColorStrategy::Tonal,
    ];

    /// Dimension value as it appears on the wire and in look names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorStrategy::Monochrome => "Monochrome",
            ColorStrategy::Neutral => "Neutral",
            ColorStrategy::Accent => "Accent",
            ColorStrategy::Tonal => "Tonal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monochrome" => Some(ColorStrategy::Monochrome),
            "neutral" => Some(ColorStrategy::Neutral),
            "accent" => Some(ColorStrategy::Accent),
            "tonal" => Some(ColorStrategy::Tonal),
            _ => None,
        }
    }

    /// Whether a candidate color belongs to this bucket, relative to the
    /// anchor color. `anchor_color` is empty when the anchor has none; only
    /// the Neutral bucket applies then.
    pub fn matches(&self, candidate_color: &str, anchor_color: &str) -> bool {
        match self {
            ColorStrategy::Neutral => is_neutral(candidate_color),
            ColorStrategy::Monochrome => {
                !anchor_color.is_empty()
                    && !candidate_color.is_empty()
                    && candidate_color.eq_ignore_ascii_case(anchor_color)
            }
            ColorStrategy::Accent => is_accent_pair(candidate_color, anchor_color),
            ColorStrategy::Tonal => {
                same_family(candidate_color, anchor_color)
                    && !candidate_color.eq_ignore_ascii_case(anchor_color)
            }
        }
    }
}

// =============================================================================
// Look Palettes (accessory rule support)
// =============================================================================

/// Color strategy of a partial look's non-accessory items, used to gate
/// accessory choices.
#[derive(Clone, Debug, PartialEq)]
pub enum Palette {
    /// No usable color information, or a mix the rules do not constrain.
    Unconstrained,
    /// Every colored item wears the same color.
    Monochrome(String),
    /// Every colored item is neutral.
    Neutral,
    /// Non-neutral colors span both hue families; accessories must pick up
    /// one of the accent colors or stay neutral.
    Accent(Vec<String>),
}

/// Classify the palette of the given (lowercased) item colors. Empty colors
/// should be filtered out by the caller.
pub fn classify_palette(colors: &[String]) -> Palette {
    if colors.is_empty() {
        return Palette::Unconstrained;
    }

    let first = &colors[0];
    if colors.iter().all(|c| c == first) {
        return Palette::Monochrome(first.clone());
    }
    if colors.iter().all(|c| is_neutral(c)) {
        return Palette::Neutral;
    }

    let non_neutral: Vec<&String> = colors.iter().filter(|c| !is_neutral(c)).collect();
    let has_warm = non_neutral
        .iter()
        .any(|c| hue_family(c) == Some(HueFamily::Warm));
    let has_cool = non_neutral
        .iter()
        .any(|c| hue_family(c) == Some(HueFamily::Cool));
    if has_warm && has_cool {
        let mut accents: Vec<String> = non_neutral.iter().map(|c| c.to_string()).collect();
        accents.dedup();
        return Palette::Accent(accents);
    }

    Palette::Unconstrained
}

/// Whether an accessory of the given color may join a look with this
/// palette. Colorless accessories count as neutral.
pub fn accessory_allowed(accessory_color: &str, palette: &Palette) -> bool {
    if is_neutral(accessory_color) {
        return true;
    }
    let lower = accessory_color.trim().to_lowercase();
    match palette {
        Palette::Unconstrained => true,
        Palette::Monochrome(color) => lower == *color,
        Palette::Neutral => false,
        Palette::Accent(accents) => accents.contains(&lower),
    }
}
