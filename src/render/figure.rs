use super::colormap::Colormap;
use super::RenderOptions;
use crate::calendar::{MonthPanel, YearLayout, DAYS_IN_WEEK, DAY_LABELS, WEEKS_IN_MONTH};
use crate::series::ValueRange;
use crate::theme::{
    points, DAY_NUMBER_SIZE, LEGEND_FONT_SIZE, MONTH_TITLE_SIZE, SUPTITLE_SIZE,
    TICK_LABEL_SIZE, WEEKDAY_LABEL_SIZE,
};
use ordered_float::OrderedFloat;
use plotters::style::RGBColor;
use std::iter::successors;

/// Vertical position of the figure title, as a fraction of the height from
/// the bottom
const SUPTITLE_Y: f64 = 0.98;

/// Gap between a panel's top edge and its weekday labels, in points
const TICK_PAD: f64 = 3.5;

/// Gap between the weekday labels and the month title, in points
const TITLE_PAD: f64 = 6.0;

/// Offset of a day number from its cell's top-left corner, as a fraction of
/// the cell size
const DAY_NUMBER_INSET: (f64, f64) = (0.07, 0.10);

/// Lower-left corner of the legend when it shares the bottom margin with the
/// colorbar, as figure fractions
const LEGEND_ANCHOR: (f64, f64) = (0.04, 0.01);

const LEGEND_COLUMNS: usize = 3;

// Legend metrics, in multiples of the legend font size
const LEGEND_BORDER_PAD: f64 = 0.4;
const LEGEND_BORDER_AXES_PAD: f64 = 0.5;
const LEGEND_HANDLE_LENGTH: f64 = 2.0;
const LEGEND_HANDLE_HEIGHT: f64 = 0.7;
const LEGEND_HANDLE_TEXT_PAD: f64 = 0.8;
const LEGEND_COLUMN_SPACING: f64 = 2.0;
const LEGEND_LABEL_SPACING: f64 = 0.5;

/// Rough advance of one character, as a multiple of the font size
const CHAR_WIDTH: f64 = 0.6;

/// Length of the colorbar's tick marks, in points
const TICK_LENGTH: f64 = 3.5;

const MAX_COLORBAR_TICKS: f64 = 6.0;

const STEP_TOLERANCE: f64 = 1e-9;

/// Arrangement of the twelve month panels
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Orientation {
    /// Three rows of four months on an 11×8.5 inch page
    #[default]
    Landscape,
    /// Four rows of three months on an 8.5×11 inch page
    Portrait,
}

/// Subplot placement as fractions of the figure, plus the gaps between
/// subplots as fractions of the subplot size
#[derive(Clone, Copy, Debug, PartialEq)]
struct SubplotParams {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    wspace: f64,
    hspace: f64,
}

impl Orientation {
    /// Number of panel rows and columns
    pub(crate) fn grid(self) -> (u32, u32) {
        match self {
            Orientation::Landscape => (3, 4),
            Orientation::Portrait => (4, 3),
        }
    }

    /// Image size in pixels
    pub(crate) fn size(self) -> (u32, u32) {
        match self {
            Orientation::Landscape => (1100, 850),
            Orientation::Portrait => (850, 1100),
        }
    }

    fn subplot_params(self) -> SubplotParams {
        match self {
            Orientation::Landscape => SubplotParams {
                left: 0.04,
                right: 0.96,
                top: 0.88,
                bottom: 0.04,
                wspace: 0.14,
                hspace: 0.12,
            },
            Orientation::Portrait => SubplotParams {
                left: 0.04,
                right: 0.96,
                top: 0.90,
                bottom: 0.04,
                wspace: 0.12,
                hspace: 0.24,
            },
        }
    }

    /// Colorbar placement as `[left, bottom, width, height]` figure fractions.
    /// The bar moves to the right when the legend occupies the lower left.
    fn colorbar_fractions(self, beside_legend: bool) -> [f64; 4] {
        match (self, beside_legend) {
            (Orientation::Portrait, true) => [0.68, 0.027, 0.275, 0.01],
            (Orientation::Portrait, false) => [0.3625, 0.027, 0.275, 0.01],
            (Orientation::Landscape, true) => [0.752, 0.033, 0.208, 0.01],
            (Orientation::Landscape, false) => [0.396, 0.033, 0.208, 0.01],
        }
    }

    /// The box allotted to each panel, in layout order (row by row)
    fn subplot_boxes(self) -> Vec<Bounds> {
        let (width, height) = self.size();
        let (width, height) = (f64::from(width), f64::from(height));
        let (rows, cols) = self.grid();
        let p = self.subplot_params();
        let box_width =
            (p.right - p.left) * width / p.wspace.mul_add(f64::from(cols - 1), f64::from(cols));
        let box_height =
            (p.top - p.bottom) * height / p.hspace.mul_add(f64::from(rows - 1), f64::from(rows));
        (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| Bounds {
                left: f64::from(c).mul_add(box_width * (1.0 + p.wspace), p.left * width),
                top: f64::from(r).mul_add(box_height * (1.0 + p.hspace), (1.0 - p.top) * height),
                width: box_width,
                height: box_height,
            })
            .collect()
    }
}

/// An axis-aligned rectangle in pixels, measured from the top-left corner of
/// the image
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) left: f64,
    pub(crate) top: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Bounds {
    /// Convert `[left, bottom, width, height]` fractions of an image of the
    /// given size, measured from its bottom-left corner
    fn from_fractions((width, height): (u32, u32), [l, b, w, h]: [f64; 4]) -> Bounds {
        let (width, height) = (f64::from(width), f64::from(height));
        Bounds {
            left: l * width,
            top: (1.0 - b - h) * height,
            width: w * width,
            height: h * height,
        }
    }

    pub(crate) fn right(&self) -> f64 {
        self.left + self.width
    }

    pub(crate) fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub(crate) fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

#[cfg(test)]
impl Bounds {
    fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        (self.left..=self.right()).contains(&x) && (self.top..=self.bottom()).contains(&y)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum HAlign {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum VAlign {
    Top,
    Center,
    Bottom,
}

/// A line of text anchored at `(x, y)`; `size` is in pixels
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TextItem {
    pub(crate) text: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) size: f64,
    pub(crate) halign: HAlign,
    pub(crate) valign: VAlign,
}

impl TextItem {
    fn new<S: Into<String>>(text: S, (x, y): (f64, f64), size: f64) -> TextItem {
        TextItem {
            text: text.into(),
            x,
            y,
            size,
            halign: HAlign::Left,
            valign: VAlign::Top,
        }
    }

    fn align(mut self, halign: HAlign, valign: VAlign) -> TextItem {
        self.halign = halign;
        self.valign = valign;
        self
    }
}

/// A complete calendar figure, positioned in pixels and ready to draw
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Figure {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) title: TextItem,
    pub(crate) panels: Vec<PanelFigure>,
    pub(crate) legend: Option<LegendFigure>,
    pub(crate) colorbar: Option<ColorbarFigure>,
}

impl Figure {
    pub(crate) fn compose(
        layout: &YearLayout,
        range: ValueRange,
        title: &str,
        options: &RenderOptions,
    ) -> Figure {
        let orientation = options.orientation;
        let (width, height) = orientation.size();
        let mut registry = LegendRegistry::default();
        let panels = layout
            .panels()
            .iter()
            .zip(orientation.subplot_boxes())
            .map(|(panel, frame)| PanelFigure::compose(panel, frame, range, options, &mut registry))
            .collect();
        let legend = registry.layout(orientation.size(), options.show_colorbar);
        let colorbar = options.show_colorbar.then(|| {
            let fractions = orientation.colorbar_fractions(legend.is_some());
            ColorbarFigure::new(
                Bounds::from_fractions(orientation.size(), fractions),
                options.colormap,
                range,
            )
        });
        let title = TextItem::new(
            title,
            (
                f64::from(width) / 2.0,
                (1.0 - SUPTITLE_Y) * f64::from(height),
            ),
            points(SUPTITLE_SIZE),
        )
        .align(HAlign::Center, VAlign::Top);
        Figure {
            width,
            height,
            title,
            panels,
            legend,
            colorbar,
        }
    }
}

#[cfg(test)]
impl Figure {
    fn panel(&self, month: time::Month) -> Option<&PanelFigure> {
        let name = month.to_string();
        self.panels.iter().find(|p| p.title.text == name)
    }
}

/// One month's heatmap
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PanelFigure {
    /// Area covered by the 7×6 cells
    pub(crate) grid: Bounds,
    pub(crate) cell_size: f64,
    pub(crate) title: TextItem,
    pub(crate) weekday_labels: Vec<TextItem>,
    pub(crate) cells: Vec<CellFigure>,
}

impl PanelFigure {
    fn compose(
        panel: &MonthPanel,
        frame: Bounds,
        range: ValueRange,
        options: &RenderOptions,
        registry: &mut LegendRegistry,
    ) -> PanelFigure {
        // Square cells, centered in the subplot box
        let cols = count(DAYS_IN_WEEK);
        let rows = count(WEEKS_IN_MONTH);
        let cell_size = (frame.width / cols).min(frame.height / rows);
        let grid = Bounds {
            left: frame.left + cols.mul_add(-cell_size, frame.width) / 2.0,
            top: frame.top + rows.mul_add(-cell_size, frame.height) / 2.0,
            width: cols * cell_size,
            height: rows * cell_size,
        };
        let label_y = grid.top - points(TICK_PAD);
        let weekday_labels = DAY_LABELS
            .iter()
            .enumerate()
            .map(|(col, &label)| {
                TextItem::new(
                    label,
                    ((count(col) + 0.5).mul_add(cell_size, grid.left), label_y),
                    points(WEEKDAY_LABEL_SIZE),
                )
                .align(HAlign::Center, VAlign::Bottom)
            })
            .collect();
        let title = TextItem::new(
            panel.month().to_string(),
            (
                grid.center_x(),
                label_y - points(WEEKDAY_LABEL_SIZE) - points(TITLE_PAD),
            ),
            points(MONTH_TITLE_SIZE),
        )
        .align(HAlign::Center, VAlign::Bottom);
        let cells = panel
            .cells()
            .map(|(row, col, day, value)| {
                let bounds = Bounds {
                    left: count(col).mul_add(cell_size, grid.left),
                    top: count(row).mul_add(cell_size, grid.top),
                    width: cell_size,
                    height: cell_size,
                };
                let highlight = options.highlights.get(value).map(|hl| {
                    if let Some(label) = &hl.label {
                        registry.register(value, hl.color, label);
                    }
                    hl.color
                });
                let label = TextItem::new(
                    day.to_string(),
                    (
                        DAY_NUMBER_INSET.0.mul_add(cell_size, bounds.left),
                        DAY_NUMBER_INSET.1.mul_add(cell_size, bounds.top),
                    ),
                    points(DAY_NUMBER_SIZE),
                );
                CellFigure {
                    bounds,
                    fill: options.colormap.color_at(range.normalize(value)),
                    highlight,
                    label,
                }
            })
            .collect();
        PanelFigure {
            grid,
            cell_size,
            title,
            weekday_labels,
            cells,
        }
    }

    /// Positions of the vertical and horizontal cell separators
    pub(crate) fn separators(&self) -> (Vec<f64>, Vec<f64>) {
        let xs = (0..=DAYS_IN_WEEK)
            .map(|i| count(i).mul_add(self.cell_size, self.grid.left))
            .collect();
        let ys = (0..=WEEKS_IN_MONTH)
            .map(|i| count(i).mul_add(self.cell_size, self.grid.top))
            .collect();
        (xs, ys)
    }
}

#[cfg(test)]
impl PanelFigure {
    fn cell(&self, day: u8) -> Option<&CellFigure> {
        let day = day.to_string();
        self.cells.iter().find(|c| c.label.text == day)
    }
}

/// One day of a month panel
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CellFigure {
    pub(crate) bounds: Bounds,
    /// Heatmap color; `None` for values with no color (NaN)
    pub(crate) fill: Option<RGBColor>,
    pub(crate) highlight: Option<RGBColor>,
    pub(crate) label: TextItem,
}

/// Labeled highlights in order of first appearance, one per highlight value
#[derive(Clone, Debug, Default, PartialEq)]
struct LegendRegistry(Vec<(OrderedFloat<f64>, RGBColor, String)>);

impl LegendRegistry {
    fn register(&mut self, value: f64, color: RGBColor, label: &str) {
        let key = OrderedFloat(value);
        if let Some(entry) = self.0.iter_mut().find(|(k, _, _)| *k == key) {
            entry.1 = color;
            label.clone_into(&mut entry.2);
        } else {
            self.0.push((key, color, label.to_owned()));
        }
    }

    fn layout(self, size: (u32, u32), beside_colorbar: bool) -> Option<LegendFigure> {
        if self.0.is_empty() {
            return None;
        }
        let (width, height) = (f64::from(size.0), f64::from(size.1));
        let em = points(LEGEND_FONT_SIZE);
        let column_lengths = column_lengths(self.0.len(), LEGEND_COLUMNS);
        let max_rows = column_lengths.first().copied().unwrap_or(1);
        let mut columns = Vec::with_capacity(column_lengths.len());
        let mut entries = self.0.into_iter();
        for &len in &column_lengths {
            columns.push(entries.by_ref().take(len).collect::<Vec<_>>());
        }
        let column_widths = columns
            .iter()
            .map(|col| {
                let text_width = col
                    .iter()
                    .map(|(_, _, label)| text_width(label, em))
                    .fold(0.0, f64::max);
                (LEGEND_HANDLE_LENGTH + LEGEND_HANDLE_TEXT_PAD).mul_add(em, text_width)
            })
            .collect::<Vec<_>>();
        let frame_width = (2.0 * LEGEND_BORDER_PAD).mul_add(
            em,
            count(columns.len() - 1).mul_add(
                LEGEND_COLUMN_SPACING * em,
                column_widths.iter().sum::<f64>(),
            ),
        );
        let frame_height = (2.0 * LEGEND_BORDER_PAD).mul_add(
            em,
            count(max_rows).mul_add(em, count(max_rows - 1) * LEGEND_LABEL_SPACING * em),
        );
        let frame = if beside_colorbar {
            Bounds {
                left: LEGEND_ANCHOR.0 * width,
                top: (1.0 - LEGEND_ANCHOR.1).mul_add(height, -frame_height),
                width: frame_width,
                height: frame_height,
            }
        } else {
            Bounds {
                left: (width - frame_width) / 2.0,
                top: LEGEND_BORDER_AXES_PAD.mul_add(-em, height) - frame_height,
                width: frame_width,
                height: frame_height,
            }
        };
        let mut items = Vec::new();
        let mut x = LEGEND_BORDER_PAD.mul_add(em, frame.left);
        for (col, col_width) in columns.into_iter().zip(column_widths) {
            for (row, (_, color, label)) in col.into_iter().enumerate() {
                let y = count(row).mul_add(
                    (1.0 + LEGEND_LABEL_SPACING) * em,
                    LEGEND_BORDER_PAD.mul_add(em, frame.top) + em / 2.0,
                );
                let swatch = Bounds {
                    left: x,
                    top: y - LEGEND_HANDLE_HEIGHT * em / 2.0,
                    width: LEGEND_HANDLE_LENGTH * em,
                    height: LEGEND_HANDLE_HEIGHT * em,
                };
                let label = TextItem::new(
                    label,
                    ((LEGEND_HANDLE_LENGTH + LEGEND_HANDLE_TEXT_PAD).mul_add(em, x), y),
                    em,
                )
                .align(HAlign::Left, VAlign::Center);
                items.push(LegendEntry {
                    swatch,
                    color,
                    label,
                });
            }
            x += LEGEND_COLUMN_SPACING.mul_add(em, col_width);
        }
        Some(LegendFigure {
            frame,
            entries: items,
        })
    }
}

/// Split `n` legend entries over at most `ncols` columns, with the longer
/// columns first
fn column_lengths(n: usize, ncols: usize) -> Vec<usize> {
    let ncols = ncols.min(n).max(1);
    let (per_col, extra) = (n / ncols, n % ncols);
    (0..ncols)
        .map(|i| per_col + usize::from(i < extra))
        .collect()
}

fn text_width(text: &str, size: f64) -> f64 {
    count(text.chars().count()) * CHAR_WIDTH * size
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LegendFigure {
    pub(crate) frame: Bounds,
    pub(crate) entries: Vec<LegendEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LegendEntry {
    pub(crate) swatch: Bounds,
    pub(crate) color: RGBColor,
    pub(crate) label: TextItem,
}

/// The shared horizontal color scale
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ColorbarFigure {
    pub(crate) bar: Bounds,
    pub(crate) colormap: Colormap,
    pub(crate) ticks: Vec<Tick>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tick {
    pub(crate) x: f64,
    pub(crate) length: f64,
    pub(crate) label: TextItem,
}

impl ColorbarFigure {
    fn new(bar: Bounds, colormap: Colormap, range: ValueRange) -> ColorbarFigure {
        let ticks = nice_ticks(range.min(), range.max());
        let step = match ticks.as_slice() {
            [a, b, ..] => b - a,
            _ => 1.0,
        };
        let ticks = ticks
            .into_iter()
            .map(|value| {
                let x = range.normalize(value).mul_add(bar.width, bar.left);
                let length = points(TICK_LENGTH);
                let label = TextItem::new(
                    format_tick(value, step),
                    (x, bar.bottom() + length + points(TICK_PAD)),
                    points(TICK_LABEL_SIZE),
                )
                .align(HAlign::Center, VAlign::Top);
                Tick {
                    x,
                    length,
                    label,
                }
            })
            .collect();
        ColorbarFigure {
            bar,
            colormap,
            ticks,
        }
    }

    /// Color of the bar at horizontal pixel position `x`
    pub(crate) fn color_at_x(&self, x: f64) -> Option<RGBColor> {
        let t = if self.bar.width > 0.0 {
            (x - self.bar.left) / self.bar.width
        } else {
            0.0
        };
        self.colormap.color_at(t)
    }
}

/// Round-numbered tick positions covering `min..=max`
fn nice_ticks(min: f64, max: f64) -> Vec<f64> {
    let span = max - min;
    if span.is_nan() || span <= 0.0 || span.is_infinite() {
        return vec![min];
    }
    let step = nice_step(span / (MAX_COLORBAR_TICKS - 1.0));
    let first = (min / step - STEP_TOLERANCE).ceil();
    let last = (max / step + STEP_TOLERANCE).floor();
    // Adding zero turns -0.0 into 0.0
    successors(Some(first), |k| Some(k + 1.0))
        .take_while(|&k| k <= last)
        .map(|k| k.mul_add(step, 0.0))
        .collect()
}

/// The smallest of 1, 2, 2.5, 5 or 10 times a power of ten that is at least
/// `raw`
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 + STEP_TOLERANCE {
        1.0
    } else if residual <= 2.0 + STEP_TOLERANCE {
        2.0
    } else if residual <= 2.5 + STEP_TOLERANCE {
        2.5
    } else if residual <= 5.0 + STEP_TOLERANCE {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Format a tick value with just enough decimals to tell neighboring ticks
/// apart
fn format_tick(value: f64, step: f64) -> String {
    let mut scale = 1.0;
    for decimals in 0..=6usize {
        let scaled = step * scale;
        if (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0) {
            return format!("{value:.decimals$}");
        }
        scale *= 10.0;
    }
    format!("{value}")
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}
