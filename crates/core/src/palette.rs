//! Curated color palettes used as the input pool for random compositions.
//!
//! Each palette is an ordered triple of hex colors. The set is fixed and
//! read-only; the generator picks one palette per composition and draws
//! every blob color from it.

/// Number of colors in every curated palette.
pub const PALETTE_SIZE: usize = 3;

const PALETTES: [Palette; 10] = [
    Palette(["#ff9a9e", "#fad0c4", "#ffecd2"]),
    Palette(["#a18cd1", "#fbc2eb", "#8fd3f4"]),
    Palette(["#84fab0", "#8fd3f4", "#a1c4fd"]),
    Palette(["#cfd9df", "#e2ebf0", "#a1c4fd"]),
    Palette(["#f093fb", "#f5576c", "#4facfe"]),
    Palette(["#43e97b", "#38f9d7", "#00c6fb"]),
    Palette(["#fa709a", "#fee140", "#ff0844"]),
    Palette(["#667eea", "#764ba2", "#6B8DD6"]),
    Palette(["#00c6fb", "#005bea", "#00F260"]),
    Palette(["#ff758c", "#ff7eb3", "#22E1FF"]),
];

/// An ordered triple of color strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette([&'static str; PALETTE_SIZE]);

impl Palette {
    /// Returns every curated palette, in a stable order.
    pub fn all() -> &'static [Palette] {
        &PALETTES
    }

    /// Returns the palette at `index`, if there is one.
    pub fn get(index: usize) -> Option<&'static Palette> {
        PALETTES.get(index)
    }

    /// Returns the palette's colors in order.
    pub fn colors(&self) -> &[&'static str] {
        &self.0
    }

    /// Returns true if `color` is one of this palette's entries.
    ///
    /// Comparison is ASCII case-insensitive, since hex colors are.
    pub fn contains(&self, color: &str) -> bool {
        self.0.iter().any(|c| c.eq_ignore_ascii_case(color))
    }
}
