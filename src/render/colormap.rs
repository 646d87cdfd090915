use plotters::style::colors::colormaps::{BlackWhite, ViridisRGB};
use plotters::style::RGBColor;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A color stop: position on `0.0..=1.0` and the color there
type Stop = (f64, [u8; 3]);

/// How a palette turns a position into a color
enum Ramp {
    Stops(&'static [Stop]),
    Builtin(fn(f64) -> RGBColor),
}

static COOL: &[Stop] = &[(0.0, [0, 255, 255]), (1.0, [255, 0, 255])];

static HOT: &[Stop] = &[
    (0.0, [10, 0, 0]),
    (0.365, [255, 0, 0]),
    (0.746, [255, 255, 0]),
    (1.0, [255, 255, 255]),
];

static BINARY: &[Stop] = &[(0.0, [255, 255, 255]), (1.0, [0, 0, 0])];

static SPRING: &[Stop] = &[(0.0, [255, 0, 255]), (1.0, [255, 255, 0])];

static SUMMER: &[Stop] = &[(0.0, [0, 128, 102]), (1.0, [255, 255, 102])];

static AUTUMN: &[Stop] = &[(0.0, [255, 0, 0]), (1.0, [255, 255, 0])];

static WINTER: &[Stop] = &[(0.0, [0, 0, 255]), (1.0, [0, 255, 128])];

static BONE: &[Stop] = &[
    (0.0, [0, 0, 0]),
    (0.365, [81, 81, 113]),
    (0.746, [166, 198, 198]),
    (1.0, [255, 255, 255]),
];

static COPPER: &[Stop] = &[(0.0, [0, 0, 0]), (0.8, [255, 159, 101]), (1.0, [255, 199, 127])];

static BLUES: &[Stop] = &[
    (0.0, [247, 251, 255]),
    (0.25, [198, 219, 239]),
    (0.5, [107, 174, 214]),
    (0.75, [33, 113, 181]),
    (1.0, [8, 48, 107]),
];

static GREENS: &[Stop] = &[
    (0.0, [247, 252, 245]),
    (0.25, [199, 233, 192]),
    (0.5, [116, 196, 118]),
    (0.75, [35, 139, 69]),
    (1.0, [0, 68, 27]),
];

static REDS: &[Stop] = &[
    (0.0, [255, 245, 240]),
    (0.25, [252, 187, 161]),
    (0.5, [251, 106, 74]),
    (0.75, [203, 24, 29]),
    (1.0, [103, 0, 13]),
];

static PURPLES: &[Stop] = &[
    (0.0, [252, 251, 253]),
    (0.25, [218, 218, 235]),
    (0.5, [158, 154, 200]),
    (0.75, [106, 81, 163]),
    (1.0, [63, 0, 125]),
];

static ORANGES: &[Stop] = &[
    (0.0, [255, 245, 235]),
    (0.25, [253, 208, 162]),
    (0.5, [253, 141, 60]),
    (0.75, [217, 72, 1]),
    (1.0, [127, 39, 4]),
];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Palette {
    #[default]
    Cool,
    Hot,
    Gray,
    Binary,
    Viridis,
    Spring,
    Summer,
    Autumn,
    Winter,
    Bone,
    Copper,
    Blues,
    Greens,
    Reds,
    Purples,
    Oranges,
}

impl Palette {
    const ALL: [Palette; 16] = [
        Palette::Cool,
        Palette::Hot,
        Palette::Gray,
        Palette::Binary,
        Palette::Viridis,
        Palette::Spring,
        Palette::Summer,
        Palette::Autumn,
        Palette::Winter,
        Palette::Bone,
        Palette::Copper,
        Palette::Blues,
        Palette::Greens,
        Palette::Reds,
        Palette::Purples,
        Palette::Oranges,
    ];

    fn name(self) -> &'static str {
        match self {
            Palette::Cool => "cool",
            Palette::Hot => "hot",
            Palette::Gray => "gray",
            Palette::Binary => "binary",
            Palette::Viridis => "viridis",
            Palette::Spring => "spring",
            Palette::Summer => "summer",
            Palette::Autumn => "autumn",
            Palette::Winter => "winter",
            Palette::Bone => "bone",
            Palette::Copper => "copper",
            Palette::Blues => "Blues",
            Palette::Greens => "Greens",
            Palette::Reds => "Reds",
            Palette::Purples => "Purples",
            Palette::Oranges => "Oranges",
        }
    }

    fn ramp(self) -> Ramp {
        match self {
            Palette::Cool => Ramp::Stops(COOL),
            Palette::Hot => Ramp::Stops(HOT),
            Palette::Gray => Ramp::Builtin(BlackWhite::get_color),
            Palette::Binary => Ramp::Stops(BINARY),
            Palette::Viridis => Ramp::Builtin(ViridisRGB::get_color),
            Palette::Spring => Ramp::Stops(SPRING),
            Palette::Summer => Ramp::Stops(SUMMER),
            Palette::Autumn => Ramp::Stops(AUTUMN),
            Palette::Winter => Ramp::Stops(WINTER),
            // plotters' Bone and Copper run through pure blue and orange,
            // not the matplotlib ramps
            Palette::Bone => Ramp::Stops(BONE),
            Palette::Copper => Ramp::Stops(COPPER),
            Palette::Blues => Ramp::Stops(BLUES),
            Palette::Greens => Ramp::Stops(GREENS),
            Palette::Reds => Ramp::Stops(REDS),
            Palette::Purples => Ramp::Stops(PURPLES),
            Palette::Oranges => Ramp::Stops(ORANGES),
        }
    }
}

/// A named, piecewise-linear mapping from `0.0..=1.0` to colors.  A `_r`
/// suffix on the name reverses the mapping.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Colormap {
    palette: Palette,
    reversed: bool,
}

impl Colormap {
    /// Color at normalized position `t`.  Positions outside `0.0..=1.0` are
    /// clamped; NaN has no color.
    pub(crate) fn color_at(&self, t: f64) -> Option<RGBColor> {
        if t.is_nan() {
            return None;
        }
        let t = t.clamp(0.0, 1.0);
        let t = if self.reversed { 1.0 - t } else { t };
        match self.palette.ramp() {
            Ramp::Stops(stops) => Some(interpolate(stops, t)),
            Ramp::Builtin(color) => Some(color(t)),
        }
    }
}

fn interpolate(stops: &[Stop], t: f64) -> RGBColor {
    let upper = stops
        .iter()
        .position(|&(pos, _)| pos >= t)
        .unwrap_or(stops.len() - 1);
    let (hi_pos, hi) = stops[upper];
    let Some(&(lo_pos, lo)) = upper.checked_sub(1).and_then(|i| stops.get(i)) else {
        return rgb(hi);
    };
    let frac = (t - lo_pos) / (hi_pos - lo_pos);
    RGBColor(
        lerp(lo[0], hi[0], frac),
        lerp(lo[1], hi[1], frac),
        lerp(lo[2], hi[2], frac),
    )
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.palette.name())?;
        if self.reversed {
            write!(f, "_r")?;
        }
        Ok(())
    }
}

impl FromStr for Colormap {
    type Err = ParseColormapError;

    fn from_str(s: &str) -> Result<Colormap, ParseColormapError> {
        let (name, reversed) = match s.strip_suffix("_r") {
            Some(name) => (name, true),
            None => (s, false),
        };
        Palette::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .map(|palette| Colormap { palette, reversed })
            .ok_or_else(|| ParseColormapError(s.to_owned()))
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown colormap: {0:?}")]
pub(crate) struct ParseColormapError(String);

fn rgb([r, g, b]: [u8; 3]) -> RGBColor {
    RGBColor(r, g, b)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(a: u8, b: u8, frac: f64) -> u8 {
    let (a, b) = (f64::from(a), f64::from(b));
    (b - a).mul_add(frac, a).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cool() {
        let cmap = Colormap::default();
        assert_eq!(cmap.to_string(), "cool");
        assert_eq!(cmap.color_at(0.0), Some(RGBColor(0, 255, 255)));
        assert_eq!(cmap.color_at(1.0), Some(RGBColor(255, 0, 255)));
        assert_eq!(cmap.color_at(0.5), Some(RGBColor(128, 128, 255)));
    }

    #[test]
    fn test_clamp_and_nan() {
        let cmap = Colormap::default();
        assert_eq!(cmap.color_at(-3.0), cmap.color_at(0.0));
        assert_eq!(cmap.color_at(7.0), cmap.color_at(1.0));
        assert_eq!(cmap.color_at(f64::NAN), None);
    }

    #[test]
    fn test_multi_stop() {
        let hot = "hot".parse::<Colormap>().expect("hot is a known colormap");
        assert_eq!(hot.color_at(0.365), Some(RGBColor(255, 0, 0)));
        assert_eq!(hot.color_at(0.746), Some(RGBColor(255, 255, 0)));
        assert_eq!(hot.color_at(1.0), Some(RGBColor(255, 255, 255)));
    }

    #[test]
    fn test_reversed() {
        let cmap = "Blues_r".parse::<Colormap>().expect("Blues_r is a known colormap");
        assert_eq!(cmap.to_string(), "Blues_r");
        assert_eq!(cmap.color_at(0.0), Some(RGBColor(8, 48, 107)));
        assert_eq!(cmap.color_at(1.0), Some(RGBColor(247, 251, 255)));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            "VIRIDIS".parse::<Colormap>(),
            "viridis".parse::<Colormap>()
        );
        assert_eq!("blues".parse::<Colormap>().map(|c| c.to_string()), Ok(String::from("Blues")));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "jet".parse::<Colormap>(),
            Err(ParseColormapError(String::from("jet")))
        );
    }

    #[test]
    fn test_builtin_ramps() {
        let gray = "gray".parse::<Colormap>().expect("gray is a known colormap");
        assert_eq!(gray.color_at(0.0), Some(RGBColor(0, 0, 0)));
        assert_eq!(gray.color_at(0.5), Some(RGBColor(128, 128, 128)));
        assert_eq!(gray.color_at(1.0), Some(RGBColor(255, 255, 255)));
        let viridis = "viridis_r".parse::<Colormap>().expect("viridis_r is a known colormap");
        assert_eq!(viridis.color_at(0.0), Some(RGBColor(254, 232, 37)));
        assert_eq!(viridis.color_at(1.0), Some(RGBColor(68, 1, 84)));
        assert_eq!(viridis.color_at(f64::NAN), None);
    }

    #[test]
    fn test_every_palette_roundtrips_name() {
        for palette in Palette::ALL {
            if let Ramp::Stops(stops) = palette.ramp() {
                assert_eq!(stops.first().map(|s| s.0), Some(0.0), "{}", palette.name());
                assert_eq!(stops.last().map(|s| s.0), Some(1.0), "{}", palette.name());
            }
            let cmap = palette.name().parse::<Colormap>();
            assert_eq!(cmap, Ok(Colormap { palette, reversed: false }));
        }
    }
}
