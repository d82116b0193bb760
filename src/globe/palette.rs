/// Continent grouping used for marker and fill colours
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    Americas,
    Oceania,
    Antarctica,
    Other,
}

/// Fallback colour for unknown continents
pub const GRAY: u32 = 0x808080;
/// North pole reference marker
pub const POLE_NORTH: u32 = 0x00ff00;
/// South pole reference marker
pub const POLE_SOUTH: u32 = 0xff0000;

impl Continent {
    /// Continents shown in the legend, in display order
    pub const LEGEND: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::Americas,
        Continent::Oceania,
        Continent::Antarctica,
    ];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Africa" => Continent::Africa,
            "Asia" => Continent::Asia,
            "Europe" => Continent::Europe,
            "Americas" => Continent::Americas,
            "Oceania" => Continent::Oceania,
            "Antarctica" => Continent::Antarctica,
            _ => Continent::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Americas => "Americas",
            Continent::Oceania => "Oceania",
            Continent::Antarctica => "Antarctica",
            Continent::Other => "Other",
        }
    }

    /// 0xRRGGBB
    pub fn rgb(self) -> u32 {
        match self {
            Continent::Africa => 0xffd700,     // Gold
            Continent::Asia => 0x00ff00,       // Green
            Continent::Europe => 0x0000ff,     // Blue
            Continent::Americas => 0xff0000,   // Red
            Continent::Oceania => 0xffa500,    // Orange
            Continent::Antarctica => 0xffffff, // White
            Continent::Other => GRAY,
        }
    }
}
