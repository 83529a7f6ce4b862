//! Color handling: ARGB packing, contrast, palette names, and the
//! background-resolution rule shared by both screens.

use egui::Color32;

pub const WHITE: u32 = 0xFFFF_FFFF;
pub const BLACK: u32 = 0xFF00_0000;
pub const LIGHT_GRAY: u32 = 0xFFCC_CCCC;
pub const GRAY: u32 = 0xFF88_8888;
pub const CYAN: u32 = 0xFF00_FFFF;
pub const YELLOW: u32 = 0xFFFF_FF00;
pub const MAGENTA: u32 = 0xFFFF_00FF;
pub const RED: u32 = 0xFFFF_0000;
pub const BLUE: u32 = 0xFF00_00FF;

/// Background swatches offered on the settings screen.
pub const BACKGROUND_PALETTE: [u32; 5] = [WHITE, LIGHT_GRAY, CYAN, YELLOW, MAGENTA];

/// Icon/text swatches offered on the settings screen.
pub const TEXT_PALETTE: [u32; 5] = [BLACK, WHITE, GRAY, RED, BLUE];

pub fn color32_from_argb(argb: u32) -> Color32 {
    let a = (argb >> 24) as u8;
    let r = (argb >> 16) as u8;
    let g = (argb >> 8) as u8;
    let b = argb as u8;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Pick black or white so a swatch label stays legible on its own swatch.
/// Perceptual luminance: 0.299 R + 0.587 G + 0.114 B over [0,1] channels.
pub fn contrasting_text_color(background: u32) -> Color32 {
    let r = ((background >> 16) & 0xFF) as f64 / 255.0;
    let g = ((background >> 8) & 0xFF) as f64 / 255.0;
    let b = (background & 0xFF) as f64 / 255.0;
    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
    if luminance > 0.5 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Human-readable name for the fixed palette; anything else is "Custom color".
pub fn color_display_name(argb: u32) -> &'static str {
    match argb {
        WHITE => "White",
        BLACK => "Black",
        LIGHT_GRAY => "Light Gray",
        CYAN => "Cyan",
        YELLOW => "Yellow",
        MAGENTA => "Magenta",
        GRAY => "Gray",
        RED => "Red",
        BLUE => "Blue",
        _ => "Custom color",
    }
}

/// What fills the window behind the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Background {
    Solid(u32),
    Image(String),
}

/// An image wins whenever a non-empty uri is stored; otherwise the solid
/// color (which itself defaults to white when unset).
pub fn resolve_background(color: u32, image_uri: Option<&str>) -> Background {
    match image_uri {
        Some(uri) if !uri.is_empty() => Background::Image(uri.to_string()),
        _ => Background::Solid(color),
    }
}
