use super::figure::{
    Bounds, ColorbarFigure, Figure, HAlign, LegendFigure, PanelFigure, TextItem, VAlign,
};
use crate::theme::{
    points, BACKGROUND_COLOR, COLORBAR_EDGE_COLOR, FONT_COLOR, GRID_COLOR, GRID_LINE_WIDTH,
    LEGEND_EDGE_COLOR,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, Pos, VPos};

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Draw a composed figure onto `area`.  Within each panel the heatmap goes
/// first, then highlights, then the cell separators, then the text.
pub(crate) fn draw_figure<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure,
) -> DrawResult<DB> {
    area.fill(&BACKGROUND_COLOR)?;
    let canvas = FigureCanvas::new(area);
    canvas.text(&figure.title)?;
    for panel in &figure.panels {
        canvas.draw_panel(panel)?;
    }
    if let Some(legend) = &figure.legend {
        canvas.draw_legend(legend)?;
    }
    if let Some(colorbar) = &figure.colorbar {
        canvas.draw_colorbar(colorbar)?;
    }
    Ok(())
}

struct FigureCanvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
}

impl<'a, DB: DrawingBackend> FigureCanvas<'a, DB> {
    fn new(area: &'a DrawingArea<DB, Shift>) -> Self {
        FigureCanvas { area }
    }

    fn draw_panel(&self, panel: &PanelFigure) -> DrawResult<DB> {
        for cell in &panel.cells {
            if let Some(color) = cell.fill {
                self.fill(cell.bounds, color)?;
            }
        }
        for cell in &panel.cells {
            if let Some(color) = cell.highlight {
                self.fill(cell.bounds, color)?;
            }
        }
        self.draw_separators(panel)?;
        for label in &panel.weekday_labels {
            self.text(label)?;
        }
        self.text(&panel.title)?;
        for cell in &panel.cells {
            self.text(&cell.label)?;
        }
        Ok(())
    }

    // The separators run along every cell edge, including the outer ones, so
    // that the panel has no visible border.
    fn draw_separators(&self, panel: &PanelFigure) -> DrawResult<DB> {
        let width = points(GRID_LINE_WIDTH);
        let half = width / 2.0;
        let (xs, ys) = panel.separators();
        for x in xs {
            let line = Bounds {
                left: x - half,
                top: panel.grid.top - half,
                width,
                height: panel.grid.height + width,
            };
            self.fill(line, GRID_COLOR)?;
        }
        for y in ys {
            let line = Bounds {
                left: panel.grid.left - half,
                top: y - half,
                width: panel.grid.width + width,
                height: width,
            };
            self.fill(line, GRID_COLOR)?;
        }
        Ok(())
    }

    fn draw_legend(&self, legend: &LegendFigure) -> DrawResult<DB> {
        self.fill(legend.frame, BACKGROUND_COLOR)?;
        self.outline(legend.frame, LEGEND_EDGE_COLOR)?;
        for entry in &legend.entries {
            self.fill(entry.swatch, entry.color)?;
            self.text(&entry.label)?;
        }
        Ok(())
    }

    fn draw_colorbar(&self, colorbar: &ColorbarFigure) -> DrawResult<DB> {
        let bar = colorbar.bar;
        let [(left, top), (right, bottom)] = corners(bar);
        for x in left..right {
            if let Some(color) = colorbar.color_at_x(f64::from(x) + 0.5) {
                self.area
                    .draw(&Rectangle::new([(x, top), (x, bottom)], color.filled()))?;
            }
        }
        self.outline(bar, COLORBAR_EDGE_COLOR)?;
        for tick in &colorbar.ticks {
            let x = px(tick.x);
            self.area.draw(&Rectangle::new(
                [(x, bottom), (x, px(bar.bottom() + tick.length))],
                COLORBAR_EDGE_COLOR.filled(),
            ))?;
            self.text(&tick.label)?;
        }
        Ok(())
    }

    fn fill(&self, bounds: Bounds, color: RGBColor) -> DrawResult<DB> {
        self.area
            .draw(&Rectangle::new(corners(bounds), color.filled()))
    }

    fn outline(&self, bounds: Bounds, color: RGBColor) -> DrawResult<DB> {
        self.area
            .draw(&Rectangle::new(corners(bounds), color.stroke_width(1)))
    }

    fn text(&self, item: &TextItem) -> DrawResult<DB> {
        let hpos = match item.halign {
            HAlign::Left => HPos::Left,
            HAlign::Center => HPos::Center,
        };
        let vpos = match item.valign {
            VAlign::Top => VPos::Top,
            VAlign::Center => VPos::Center,
            VAlign::Bottom => VPos::Bottom,
        };
        let style = FontDesc::new(FontFamily::SansSerif, item.size, FontStyle::Normal)
            .color(&FONT_COLOR)
            .pos(Pos::new(hpos, vpos));
        self.area.draw(&Text::new(
            item.text.as_str(),
            (px(item.x), px(item.y)),
            style,
        ))
    }
}

fn corners(bounds: Bounds) -> [(i32, i32); 2] {
    [
        (px(bounds.left), px(bounds.top)),
        (px(bounds.right()), px(bounds.bottom())),
    ]
}

#[allow(clippy::cast_possible_truncation)]
fn px(v: f64) -> i32 {
    v.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearLayout;
    use crate::render::highlight::{Highlight, HighlightMap};
    use crate::render::RenderOptions;
    use crate::series::Series;
    use plotters_backend::{
        BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingErrorKind,
    };
    use std::cell::RefCell;
    use std::rc::Rc;
    use time::macros::date;

    #[derive(Clone, Debug, Eq, PartialEq)]
    enum Op {
        Rect {
            corners: [BackendCoord; 2],
            rgb: (u8, u8, u8),
            fill: bool,
        },
        Text {
            text: String,
            pos: BackendCoord,
        },
    }

    /// A backend that records rectangles and text instead of rasterizing
    /// them, so no fonts are needed
    #[derive(Debug)]
    struct Recorder {
        size: (u32, u32),
        ops: Rc<RefCell<Vec<Op>>>,
    }

    impl DrawingBackend for Recorder {
        type ErrorType = std::io::Error;

        fn get_size(&self) -> (u32, u32) {
            self.size
        }

        fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_pixel(
            &mut self,
            _point: BackendCoord,
            _color: BackendColor,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_rect<S: BackendStyle>(
            &mut self,
            upper_left: BackendCoord,
            bottom_right: BackendCoord,
            style: &S,
            fill: bool,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            self.ops.borrow_mut().push(Op::Rect {
                corners: [upper_left, bottom_right],
                rgb: style.color().rgb,
                fill,
            });
            Ok(())
        }

        fn draw_text<TStyle: BackendTextStyle>(
            &mut self,
            text: &str,
            _style: &TStyle,
            pos: BackendCoord,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            self.ops.borrow_mut().push(Op::Text {
                text: text.to_owned(),
                pos,
            });
            Ok(())
        }
    }

    fn record(figure: &Figure) -> Vec<Op> {
        let ops = Rc::new(RefCell::new(Vec::new()));
        let backend = Recorder {
            size: (figure.width, figure.height),
            ops: Rc::clone(&ops),
        };
        let area = backend.into_drawing_area();
        draw_figure(&area, figure).expect("recording should not fail");
        ops.take()
    }

    fn compose(series: &Series, options: &RenderOptions) -> Figure {
        let layout = YearLayout::split_months(series, 2021).expect("valid year");
        Figure::compose(&layout, series.value_range(), "2021", options)
    }

    fn rect_index(ops: &[Op], corners: [BackendCoord; 2], rgb: (u8, u8, u8)) -> Option<usize> {
        ops.iter().position(|op| {
            *op == Op::Rect {
                corners,
                rgb,
                fill: true,
            }
        })
    }

    fn text_indices<'a>(ops: &'a [Op], wanted: &'a str) -> impl Iterator<Item = usize> + 'a {
        ops.iter()
            .enumerate()
            .filter(move |(_, op)| matches!(op, Op::Text { text, .. } if text == wanted))
            .map(|(i, _)| i)
    }

    #[test]
    fn test_highlight_drawn_over_heatmap() {
        let series = Series::from_iter([(date!(2021 - 07 - 04), 100.0)]);
        let mut highlights = HighlightMap::new();
        highlights.insert(100.0, Highlight::new(RGBColor(255, 0, 0)).label("Holiday"));
        let figure = compose(&series, &RenderOptions::new().highlights(highlights));
        let ops = record(&figure);

        let july = &figure.panels[6];
        let cell = &july.cells[3];
        assert_eq!(cell.label.text, "4");
        let cell_corners = corners(cell.bounds);
        let heat = cell.fill.expect("finite values are colored");
        let heat_at = rect_index(&ops, cell_corners, (heat.0, heat.1, heat.2))
            .expect("heatmap cell should be drawn");
        let red_at =
            rect_index(&ops, cell_corners, (255, 0, 0)).expect("highlight should be drawn");
        assert!(heat_at < red_at);
        let label_at = text_indices(&ops, "4")
            .find(|&i| i > red_at)
            .expect("day number should be drawn after the highlight");
        assert!(label_at > red_at);
        assert_eq!(text_indices(&ops, "Holiday").count(), 1);
        assert_eq!(text_indices(&ops, "July").count(), 1);
        assert_eq!(text_indices(&ops, "2021").count(), 1);
    }

    #[test]
    fn test_every_day_annotated() {
        let figure = compose(&Series::new(), &RenderOptions::new());
        let ops = record(&figure);
        assert_eq!(text_indices(&ops, "1").count(), 12);
        assert_eq!(text_indices(&ops, "29").count(), 11);
        assert_eq!(text_indices(&ops, "31").count(), 7);
        assert_eq!(text_indices(&ops, "S").count(), 24);
        assert!(!ops
            .iter()
            .any(|op| matches!(op, Op::Rect { rgb, .. } if *rgb == (255, 0, 0))));
    }

    #[test]
    fn test_colorbar_drawn() {
        let series = Series::from_iter([
            (date!(2021 - 01 - 01), -5.0),
            (date!(2021 - 06 - 01), 50.0),
        ]);
        let figure = compose(&series, &RenderOptions::new().show_colorbar(true));
        let colorbar = figure.colorbar.clone().expect("colorbar requested");
        let ops = record(&figure);
        let [(left, top), (right, bottom)] = corners(colorbar.bar);
        let strips = ops
            .iter()
            .filter(|op| {
                matches!(op, Op::Rect { corners: [(x0, y0), (x1, y1)], fill: true, .. }
                    if x0 == x1 && *y0 == top && *y1 == bottom && (left..right).contains(x0))
            })
            .count();
        assert_eq!(strips, usize::try_from(right - left).expect("positive width"));
        assert!(ops.contains(&Op::Rect {
            corners: [(left, top), (right, bottom)],
            rgb: (0, 0, 0),
            fill: false,
        }));
        let tick_labels = ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, pos } if pos.1 > bottom => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(tick_labels, ["0", "20", "40"]);
    }
}
