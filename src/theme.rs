use plotters::style::{RGBColor, BLACK, WHITE};
use thiserror::Error;

pub(crate) const BACKGROUND_COLOR: RGBColor = WHITE;

pub(crate) const GRID_COLOR: RGBColor = WHITE;

pub(crate) const FONT_COLOR: RGBColor = BLACK;

pub(crate) const LEGEND_EDGE_COLOR: RGBColor = RGBColor(204, 204, 204);

pub(crate) const COLORBAR_EDGE_COLOR: RGBColor = BLACK;

/// Resolution of the output image; all sizes below are in points
pub(crate) const DPI: f64 = 100.0;

pub(crate) const SUPTITLE_SIZE: f64 = 16.0;

pub(crate) const MONTH_TITLE_SIZE: f64 = 12.0;

pub(crate) const WEEKDAY_LABEL_SIZE: f64 = 10.0;

pub(crate) const DAY_NUMBER_SIZE: f64 = 8.0;

pub(crate) const LEGEND_FONT_SIZE: f64 = 10.0;

pub(crate) const TICK_LABEL_SIZE: f64 = 10.0;

pub(crate) const GRID_LINE_WIDTH: f64 = 2.1;

/// Convert a length in points to pixels
pub(crate) fn points(pt: f64) -> f64 {
    pt * DPI / 72.0
}

/// Parse a color given as a single-letter code (`"r"`), a common color name
/// (`"orange"`), or hex (`"#f80"`, `"#ff8800"`)
pub(crate) fn parse_color(s: &str) -> Result<RGBColor, ParseColorError> {
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ParseColorError(s.to_owned()));
    }
    named_color(&s.to_ascii_lowercase()).ok_or_else(|| ParseColorError(s.to_owned()))
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, i) in rgb.iter_mut().zip(0..3) {
                *slot = channel(&hex[i..=i])? * 17;
            }
            Some(RGBColor(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(RGBColor(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<RGBColor> {
    let (r, g, b) = match name {
        "b" => (0, 0, 255),
        "g" => (0, 128, 0),
        "r" => (255, 0, 0),
        "c" => (0, 191, 191),
        "m" => (191, 0, 191),
        "y" => (191, 191, 0),
        "k" | "black" => (0, 0, 0),
        "w" | "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gray" | "grey" => (128, 128, 128),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "silver" => (192, 192, 192),
        "gold" => (255, 215, 0),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "olive" => (128, 128, 0),
        "maroon" => (128, 0, 0),
        "lime" => (0, 255, 0),
        "violet" => (238, 130, 238),
        "salmon" => (250, 128, 114),
        "tomato" => (255, 99, 71),
        "coral" => (255, 127, 80),
        "crimson" => (220, 20, 60),
        "indigo" => (75, 0, 130),
        "turquoise" => (64, 224, 208),
        _ => return None,
    };
    Some(RGBColor(r, g, b))
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unrecognized color: {0:?}")]
pub(crate) struct ParseColorError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named() {
        assert_eq!(parse_color("red"), Ok(RGBColor(255, 0, 0)));
        assert_eq!(parse_color("Orange"), Ok(RGBColor(255, 165, 0)));
        assert_eq!(parse_color("k"), Ok(RGBColor(0, 0, 0)));
        assert_eq!(parse_color("grey"), parse_color("gray"));
    }

    #[test]
    fn test_hex() {
        assert_eq!(parse_color("#ff8800"), Ok(RGBColor(255, 136, 0)));
        assert_eq!(parse_color("#F80"), Ok(RGBColor(255, 136, 0)));
        assert!(parse_color("#ff88").is_err());
        assert!(parse_color("#gg0000").is_err());
        assert!(parse_color("#ééé").is_err());
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            parse_color("chartreuse-ish"),
            Err(ParseColorError(String::from("chartreuse-ish")))
        );
    }

    #[test]
    fn test_points() {
        assert_eq!(points(72.0), DPI);
    }
}
