//! Plotters-powered price-by-weight chart widget for Ratatui.
//!
//! The chart shows the $/cwt price of every bracket in the selected
//! sex+grade slice against its average weight, with the purchase and sale
//! brackets highlighted. Feeder prices usually fall as weight rises; the
//! slope between the two highlights is what drives value of gain.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct PriceChart<'a> {
    /// Price curve across the slice's brackets, sorted by weight.
    pub curve: &'a [(f64, f64)],
    /// Selected purchase bracket.
    pub purchase: Option<(f64, f64)>,
    /// Selected sale bracket.
    pub sale: Option<(f64, f64)>,
    /// X bounds (avg weight, lbs).
    pub x_bounds: [f64; 2],
    /// Y bounds (price, $/cwt).
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("avg weight (lbs)")
                .y_desc("price ($/cwt)")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255); // cyan
            let purchase_color = RGBColor(255, 255, 0); // yellow
            let sale_color = RGBColor(0, 255, 0); // green

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;
            chart.draw_series(self.curve.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a colored
            // pixel reliably overrides the white bracket point.
            chart.draw_series(self.purchase.into_iter().map(|p| Pixel::new(p, purchase_color)))?;
            chart.draw_series(self.sale.into_iter().map(|p| Pixel::new(p, sale_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Sorted price series plus padded bounds for a slice.
pub fn price_series(points: &[(f64, f64)]) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let mut curve: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    curve.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &curve {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        let mid = if x_min.is_finite() { x_min } else { 600.0 };
        x_min = mid - 50.0;
        x_max = mid + 50.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let mid = if y_min.is_finite() { y_min } else { 200.0 };
        y_min = mid - 10.0;
        y_max = mid + 10.0;
    }

    let x_pad = (x_max - x_min) * 0.05;
    let y_pad = (y_max - y_min) * 0.05;
    (
        curve,
        [x_min - x_pad, x_max + x_pad],
        [y_min - y_pad, y_max + y_pad],
    )
}
