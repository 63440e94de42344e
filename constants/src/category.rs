/// Category slot for the radial layout and node colouring.
pub struct CategoryInfo {
    pub name: &'static str,
    /// sRGB colour as 0xRRGGBB.
    pub colour: u32,
}

/// Default category domain. Order decides the radial sector index, and
/// entities without a usable category fall back to the first entry.
pub const CATEGORY_MAP: &[CategoryInfo] = &[
    CategoryInfo {
        name: "ethics",
        colour: 0xff006e,
    },
    CategoryInfo {
        name: "aesthetics",
        colour: 0x8338ec,
    },
    CategoryInfo {
        name: "logic",
        colour: 0x3a86ff,
    },
    CategoryInfo {
        name: "politics",
        colour: 0xfb5607,
    },
    CategoryInfo {
        name: "metaphysics",
        colour: 0xffbe0b,
    },
];

/// Colour used for nodes whose category is outside the configured domain.
pub const FALLBACK_NODE_COLOUR: u32 = 0xffffff;

/// Split a 0xRRGGBB value into normalised sRGB channels.
pub const fn hex_to_srgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
