mod backend;
mod canvas;
mod colormap;
mod figure;
mod highlight;
use self::backend::FontSafeBackend;
use self::canvas::draw_figure;
pub(crate) use self::colormap::Colormap;
use self::figure::Figure;
pub(crate) use self::figure::Orientation;
pub(crate) use self::highlight::{HighlightMap, HighlightRule};
use crate::calendar::YearLayout;
use crate::series::Series;
use anyhow::Context;
use plotters::prelude::*;
use std::path::PathBuf;

/// Settings for [`create_year_calendar`]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RenderOptions {
    title: Option<String>,
    filename: Option<PathBuf>,
    colormap: Colormap,
    highlights: HighlightMap,
    show_colorbar: bool,
    orientation: Orientation,
}

impl RenderOptions {
    pub(crate) fn new() -> RenderOptions {
        RenderOptions::default()
    }

    /// Figure title; defaults to the year
    pub(crate) fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Output path; defaults to the title with spaces replaced by
    /// underscores, plus `.png`
    pub(crate) fn filename<P: Into<PathBuf>>(mut self, filename: P) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub(crate) fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub(crate) fn highlights(mut self, highlights: HighlightMap) -> Self {
        self.highlights = highlights;
        self
    }

    pub(crate) fn show_colorbar(mut self, show_colorbar: bool) -> Self {
        self.show_colorbar = show_colorbar;
        self
    }

    pub(crate) fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    fn resolve_title(&self, year: i32) -> String {
        self.title.clone().unwrap_or_else(|| year.to_string())
    }

    fn resolve_filename(&self, title: &str) -> PathBuf {
        self.filename
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.png", title.replace(' ', "_"))))
    }
}

/// Render `year` of `series` as a calendar heatmap and write it as a PNG.
/// Returns the path written to.
pub(crate) fn create_year_calendar(
    series: &Series,
    year: i32,
    options: &RenderOptions,
) -> anyhow::Result<PathBuf> {
    let title = options.resolve_title(year);
    let path = options.resolve_filename(&title);
    let range = series.value_range();
    tracing::debug!(
        year,
        min = range.min(),
        max = range.max(),
        colormap = %options.colormap,
        "Computed color scale"
    );
    let layout = YearLayout::split_months(series, year)
        .with_context(|| format!("cannot lay out calendar for year {year}"))?;
    let figure = Figure::compose(&layout, range, &title, options);
    tracing::debug!(
        orientation = ?options.orientation,
        width = figure.width,
        height = figure.height,
        legend_entries = figure.legend.as_ref().map_or(0, |l| l.entries.len()),
        "Composed figure"
    );
    {
        let backend = BitMapBackend::new(&path, (figure.width, figure.height));
        let root = FontSafeBackend::new(backend).into_drawing_area();
        draw_figure(&root, &figure)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to draw {}", path.display()))?;
        root.present()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::info!(
        path = %path.display(),
        year = layout.year(),
        entries = series.len(),
        "Wrote calendar"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::highlight::Highlight;
    use std::fs;
    use time::macros::date;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("calheat-{}-{name}.png", std::process::id()))
    }

    fn assert_renders(series: &Series, options: RenderOptions, name: &str) {
        let path = scratch_path(name);
        let written = create_year_calendar(series, 2021, &options.filename(&path))
            .expect("calendar should render");
        assert_eq!(written, path);
        let size = fs::metadata(&written).map(|m| m.len());
        let _ = fs::remove_file(&written);
        assert!(
            size.is_ok_and(|n| n > 0),
            "{} should be a non-empty file",
            written.display()
        );
    }

    fn sample_series() -> Series {
        Series::from_iter([
            (date!(2021 - 01 - 01), -5.0),
            (date!(2021 - 06 - 01), 50.0),
            (date!(2021 - 07 - 04), 100.0),
            (date!(2021 - 12 - 25), 100.0),
        ])
    }

    #[test]
    fn test_render_landscape() {
        assert_renders(&sample_series(), RenderOptions::new(), "landscape");
    }

    #[test]
    fn test_render_portrait() {
        let options = RenderOptions::new()
            .title("Portrait 2021")
            .orientation(Orientation::Portrait);
        assert_renders(&sample_series(), options, "portrait");
    }

    #[test]
    fn test_render_colorbar_and_legend() {
        let mut highlights = HighlightMap::new();
        highlights.insert(100.0, Highlight::new(RGBColor(255, 0, 0)).label("Holiday"));
        highlights.insert(-5.0, Highlight::new(RGBColor(0, 0, 255)));
        let options = RenderOptions::new()
            .colormap("viridis".parse().expect("known colormap"))
            .highlights(highlights)
            .show_colorbar(true);
        assert_renders(&sample_series(), options, "colorbar");
    }

    #[test]
    fn test_render_empty_series_portrait_colorbar() {
        let options = RenderOptions::new()
            .orientation(Orientation::Portrait)
            .show_colorbar(true);
        assert_renders(&Series::new(), options, "empty");
    }

    #[test]
    fn test_default_title_and_filename() {
        let options = RenderOptions::new();
        let title = options.resolve_title(2021);
        assert_eq!(title, "2021");
        assert_eq!(options.resolve_filename(&title), PathBuf::from("2021.png"));
    }

    #[test]
    fn test_filename_from_title() {
        let options = RenderOptions::new().title("Sales by day 2021");
        let title = options.resolve_title(2021);
        assert_eq!(title, "Sales by day 2021");
        assert_eq!(
            options.resolve_filename(&title),
            PathBuf::from("Sales_by_day_2021.png")
        );
    }

    #[test]
    fn test_explicit_filename() {
        let options = RenderOptions::new().title("Ignored here").filename("out/cal.png");
        let title = options.resolve_title(1999);
        assert_eq!(options.resolve_filename(&title), PathBuf::from("out/cal.png"));
    }

    #[test]
    fn test_builder() {
        let cmap = "hot".parse::<Colormap>().expect("hot is a known colormap");
        let options = RenderOptions::new()
            .colormap(cmap)
            .show_colorbar(true)
            .orientation(Orientation::Portrait);
        assert_eq!(options.colormap, cmap);
        assert!(options.show_colorbar);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert!(options.highlights.is_empty());
    }

    #[test]
    fn test_invalid_year_is_error() {
        let options = RenderOptions::new().filename("never-written.png");
        let r = create_year_calendar(&Series::new(), 10_000, &options);
        assert!(r.is_err());
        assert!(!std::path::Path::new("never-written.png").exists());
    }
}
