//! Foreground color parsing and resolution.

use crate::foundation::resolve::Resolution;

/// Straight (non-premultiplied) RGB triple for the verse foreground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// White, the color substituted when a request fails to parse.
pub const FALLBACK_COLOR: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Channel-sum threshold below which a foreground counts as "dark"
/// (roughly 50% of the 765 maximum).
pub const DARK_TEXT_THRESHOLD: u16 = 382;

/// Alpha applied to the shadow run under each text line.
pub const SHADOW_ALPHA: u8 = 128;

/// Shadow color variant chosen from the foreground's luminance proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowColor {
    /// Translucent black, used under light foregrounds.
    Dark,
    /// Translucent white, used under dark foregrounds.
    Light,
}

impl ShadowColor {
    /// RGBA channels of this shadow variant.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Dark => [0, 0, 0, SHADOW_ALPHA],
            Self::Light => [255, 255, 255, SHADOW_ALPHA],
        }
    }
}

/// Pick the shadow variant that keeps `fg` legible.
///
/// A channel sum below [`DARK_TEXT_THRESHOLD`] marks the foreground as dark
/// and selects the light shadow; the sum exactly at the threshold selects the
/// dark one.
pub fn shadow_for(fg: Rgb) -> ShadowColor {
    let sum = u16::from(fg.r) + u16::from(fg.g) + u16::from(fg.b);
    if sum < DARK_TEXT_THRESHOLD {
        ShadowColor::Light
    } else {
        ShadowColor::Dark
    }
}

/// Parse a `#RRGGBB` (or bare `RRGGBB`) hex color.
pub fn parse_hex(s: &str) -> Result<Rgb, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if s.len() != 6 || !s.is_ascii() {
        return Err("hex color must be #RRGGBB (case-insensitive)".to_owned());
    }

    Ok(Rgb {
        r: hex_byte(&s[0..2])?,
        g: hex_byte(&s[2..4])?,
        b: hex_byte(&s[4..6])?,
    })
}

/// Resolve a requested color string, substituting white on any parse failure.
///
/// Never fails; the tag records whether the request was honored.
pub fn resolve_color(requested: &str) -> Resolution<Rgb> {
    match parse_hex(requested) {
        Ok(rgb) => Resolution::Primary(rgb),
        Err(e) => Resolution::fallback(
            FALLBACK_COLOR,
            format!("color \"{requested}\" did not parse ({e}); using white"),
        ),
    }
}
