//! Chart Plotter Module
//! Draws figure descriptions as interactive egui_plot charts.

use crate::charts::figure::{
    AxisScale, BarMode, BarTrace, Figure, GeoColor, GeoTrace, HierarchyStyle, LineTrace,
    OhlcStyle, OhlcTrace, Orientation, PolarTrace, ScatterTrace, Trace,
};
use crate::charts::geometry::{
    children_of, sector_polygon, sunburst_layout, treemap_layout, Bin, BoxStats, HierNode, Rect,
    WaterfallMeasure, WaterfallStep,
};
use egui::{Align2, Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, PlotUi, Points, Polygon, Text,
};
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Plotly's default qualitative palette
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(99, 110, 250),
    Color32::from_rgb(239, 85, 59),
    Color32::from_rgb(0, 204, 150),
    Color32::from_rgb(171, 99, 250),
    Color32::from_rgb(255, 161, 90),
    Color32::from_rgb(25, 211, 243),
    Color32::from_rgb(255, 102, 146),
    Color32::from_rgb(182, 232, 128),
    Color32::from_rgb(255, 151, 255),
    Color32::from_rgb(254, 203, 82),
];

const INCREASING: Color32 = Color32::from_rgb(61, 153, 112);
const DECREASING: Color32 = Color32::from_rgb(255, 65, 54);
const TOTAL: Color32 = Color32::from_rgb(68, 153, 255);
const CONNECTOR: Color32 = Color32::from_rgb(63, 63, 63);

/// Plasma colour scale stops
const SCALE: [Color32; 5] = [
    Color32::from_rgb(13, 8, 135),
    Color32::from_rgb(126, 3, 168),
    Color32::from_rgb(204, 71, 120),
    Color32::from_rgb(248, 149, 64),
    Color32::from_rgb(240, 249, 33),
];

/// Largest angle drawn as one polygon; egui fills only convex shapes.
const MAX_PIECE_ANGLE: f64 = TAU / 120.0;

/// Draws figures with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for the n-th series.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Blend a colour towards white.
    pub fn lighten(color: Color32, amount: f32) -> Color32 {
        let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount.clamp(0.0, 1.0)).round() as u8;
        Color32::from_rgb(mix(color.r()), mix(color.g()), mix(color.b()))
    }

    /// Sample the continuous colour scale at `t` in 0..=1.
    pub fn scale_color(t: f64) -> Color32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (SCALE.len() - 1) as f64;
        let i = (pos.floor() as usize).min(SCALE.len() - 2);
        let f = (pos - i as f64) as f32;
        let (a, b) = (SCALE[i], SCALE[i + 1]);
        let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * f).round() as u8;
        Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
    }

    /// Spread points sharing a (rounded) value sideways around `center`.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64, precision: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];

        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();
        for (i, &y) in y_values.iter().enumerate() {
            let key = (y * precision).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    /// Draw one figure: title line, then the plot.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, height: f32) {
        ui.label(RichText::new(&figure.title).size(16.0).strong());
        ui.add_space(4.0);

        let shape_only = figure
            .traces
            .iter()
            .all(|t| matches!(t, Trace::Pie { .. } | Trace::Polar(_) | Trace::Hierarchy { .. }));

        if shape_only {
            Self::shape_plot(figure, height).show(ui, |plot_ui| {
                for trace in &figure.traces {
                    match trace {
                        Trace::Pie { labels, values, hole } => {
                            Self::draw_pie(plot_ui, labels, values, *hole)
                        }
                        Trace::Hierarchy { style, nodes } => match style {
                            HierarchyStyle::Treemap => Self::draw_treemap(plot_ui, nodes),
                            HierarchyStyle::Sunburst => Self::draw_sunburst(plot_ui, nodes),
                        },
                        _ => {}
                    }
                }
                let polar: Vec<&PolarTrace> = figure
                    .traces
                    .iter()
                    .filter_map(|t| match t {
                        Trace::Polar(p) => Some(p),
                        _ => None,
                    })
                    .collect();
                if !polar.is_empty() {
                    Self::draw_radar(plot_ui, &polar, figure.radial_range.unwrap_or((0.0, 1.0)));
                }
            });
        } else {
            Self::cartesian_plot(figure, height).show(ui, |plot_ui| {
                Self::draw_cartesian(plot_ui, figure);
            });
        }
    }

    /// Equal-aspect plot without axes, for pies, radars and hierarchies.
    fn shape_plot(figure: &Figure, height: f32) -> Plot<'static> {
        let mut plot = Plot::new(format!("figure_{}", figure.id))
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .allow_scroll(false)
            .allow_drag(false)
            .allow_zoom(false);
        if figure.show_legend {
            plot = plot.legend(Legend::default());
        }
        plot
    }

    fn cartesian_plot(figure: &Figure, height: f32) -> Plot<'static> {
        let mut plot = Plot::new(format!("figure_{}", figure.id))
            .height(height)
            .allow_scroll(false);
        if figure.show_legend {
            plot = plot.legend(Legend::default());
        }
        if let Some(x) = &figure.x_title {
            plot = plot.x_axis_label(x.clone());
        }
        if let Some(y) = &figure.y_title {
            plot = plot.y_axis_label(y.clone());
        }

        match &figure.x_axis {
            AxisScale::Category(labels) => {
                let count = labels.len();
                let labels = labels.clone();
                plot = plot
                    .x_grid_spacer(move |_input| category_marks(count))
                    .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value));
            }
            AxisScale::Date => {
                plot = plot.x_axis_formatter(|mark, _range| day_label(mark.value));
                plot = plot.label_formatter(|name, value| {
                    let date = format_day(value.x.round()).unwrap_or_default();
                    if name.is_empty() {
                        format!("{}\n{:.2}", date, value.y)
                    } else {
                        format!("{}\n{}\n{:.2}", name, date, value.y)
                    }
                });
            }
            AxisScale::Numeric => {}
        }

        if let AxisScale::Category(labels) = &figure.y_axis {
            let count = labels.len();
            let labels = labels.clone();
            plot = plot
                .y_grid_spacer(move |_input| category_marks(count))
                .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value));
        }

        if figure.traces.iter().any(|t| matches!(t, Trace::Bar(_) | Trace::Waterfall { .. })) {
            plot = match figure.orientation {
                Orientation::Vertical => plot.include_y(0.0),
                Orientation::Horizontal => plot.include_x(0.0),
            };
        }
        if figure.traces.iter().any(|t| matches!(t, Trace::Geo(_))) {
            plot = plot.data_aspect(1.0).include_x(100.0).include_x(126.0).include_y(18.0).include_y(43.0);
        }

        plot
    }

    fn draw_cartesian(plot_ui: &mut PlotUi, figure: &Figure) {
        let bars: Vec<&BarTrace> = figure
            .traces
            .iter()
            .filter_map(|t| match t {
                Trace::Bar(b) => Some(b),
                _ => None,
            })
            .collect();
        if !bars.is_empty() {
            Self::draw_bars(plot_ui, &bars, figure.bar_mode, figure.orientation);
        }

        // a histogram and its density curve share the colour of their series
        let mut per_kind: HashMap<&'static str, usize> = HashMap::new();
        for trace in &figure.traces {
            let counter = per_kind.entry(trace.kind_name()).or_insert(0);
            let color = Self::series_color(*counter);
            *counter += 1;
            match trace {
                Trace::Bar(_) => {}
                Trace::Line(line) => Self::draw_line(plot_ui, line, color),
                Trace::Scatter(scatter) => Self::draw_scatter(plot_ui, scatter, color),
                Trace::Histogram { name, bins } => Self::draw_histogram(plot_ui, name, bins, color),
                Trace::Box { name, slot, stats } => Self::draw_box(plot_ui, name, *slot, stats, color),
                Trace::Violin {
                    name,
                    slot,
                    outline,
                    stats,
                    points,
                } => Self::draw_violin(plot_ui, name, *slot, outline, stats, points, color),
                Trace::Waterfall { name, steps, text } => Self::draw_waterfall(plot_ui, name, steps, text),
                Trace::Funnel { values } => Self::draw_funnel(plot_ui, values),
                Trace::Ohlc(ohlc) => Self::draw_ohlc(plot_ui, ohlc),
                Trace::Geo(geo) => Self::draw_geo(plot_ui, geo),
                Trace::Pie { .. } | Trace::Polar(_) | Trace::Hierarchy { .. } => {}
            }
        }
    }

    fn draw_bars(plot_ui: &mut PlotUi, traces: &[&BarTrace], mode: BarMode, orientation: Orientation) {
        let n = traces.len();
        let width = match mode {
            BarMode::Group => 0.8 / n as f64,
            BarMode::Stack => 0.8,
        };

        let mut charts: Vec<BarChart> = Vec::with_capacity(n);
        for (i, trace) in traces.iter().enumerate() {
            let color = Self::series_color(i);
            let offset = match mode {
                BarMode::Group => (i as f64 - (n as f64 - 1.0) / 2.0) * width,
                BarMode::Stack => 0.0,
            };
            let bars: Vec<Bar> = trace
                .slots
                .iter()
                .zip(&trace.values)
                .map(|(&slot, &value)| {
                    Bar::new(slot as f64 + offset, value)
                        .width(width)
                        .name(&trace.name)
                        .fill(color)
                })
                .collect();

            let mut chart = BarChart::new(bars).name(&trace.name).color(color);
            if orientation == Orientation::Horizontal {
                chart = chart.horizontal();
            }
            if mode == BarMode::Stack && !charts.is_empty() {
                let below: Vec<&BarChart> = charts.iter().collect();
                chart = chart.stack_on(&below);
            }
            charts.push(chart);
        }

        for chart in charts {
            plot_ui.bar_chart(chart);
        }
    }

    fn draw_line(plot_ui: &mut PlotUi, line: &LineTrace, color: Color32) {
        let points: Vec<[f64; 2]> = line.x.iter().zip(&line.y).map(|(&x, &y)| [x, y]).collect();

        if let Some(base) = &line.base {
            // one quad per segment keeps every polygon convex
            for i in 1..points.len() {
                let quad = vec![
                    [line.x[i - 1], base[i - 1]],
                    [line.x[i - 1], line.y[i - 1]],
                    [line.x[i], line.y[i]],
                    [line.x[i], base[i]],
                ];
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(quad))
                        .fill_color(color.gamma_multiply(0.45))
                        .stroke(Stroke::NONE)
                        .name(&line.name),
                );
            }
        }

        plot_ui.line(
            Line::new(PlotPoints::from_iter(points.iter().copied()))
                .color(color)
                .width(2.0)
                .name(&line.name),
        );

        if line.markers {
            plot_ui.points(
                Points::new(PlotPoints::from_iter(points.iter().copied()))
                    .radius(4.0)
                    .color(color)
                    .name(&line.name),
            );
        }
    }

    fn draw_scatter(plot_ui: &mut PlotUi, scatter: &ScatterTrace, color: Color32) {
        match &scatter.sizes {
            None => {
                let points: PlotPoints = scatter.x.iter().zip(&scatter.y).map(|(&x, &y)| [x, y]).collect();
                plot_ui.points(Points::new(points).radius(4.0).color(color).name(&scatter.name));
            }
            Some(sizes) => {
                for ((&x, &y), &d) in scatter.x.iter().zip(&scatter.y).zip(sizes) {
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[x, y]]))
                            .radius((d / 2.0).max(1.0) as f32)
                            .color(color.gamma_multiply(0.7))
                            .filled(true)
                            .name(&scatter.name),
                    );
                }
            }
        }
    }

    fn draw_histogram(plot_ui: &mut PlotUi, name: &str, bins: &[Bin], color: Color32) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|b| Bar::new(b.center(), b.value).width(b.width()).fill(color.gamma_multiply(0.6)))
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).name(name).color(color));
    }

    fn box_elem(slot: usize, stats: &BoxStats, width: f64, color: Color32) -> BoxElem {
        BoxElem::new(
            slot as f64,
            BoxSpread::new(stats.whisker_low, stats.q1, stats.median, stats.q3, stats.whisker_high),
        )
        .box_width(width)
        .whisker_width(width * 0.5)
        .fill(color.gamma_multiply(0.3))
        .stroke(Stroke::new(1.5, color))
    }

    fn draw_box(plot_ui: &mut PlotUi, name: &str, slot: usize, stats: &BoxStats, color: Color32) {
        plot_ui.box_plot(BoxPlot::new(vec![Self::box_elem(slot, stats, 0.5, color).name(name)]).name(name));

        if !stats.outliers.is_empty() {
            let points: PlotPoints = stats.outliers.iter().map(|&y| [slot as f64, y]).collect();
            plot_ui.points(Points::new(points).radius(3.0).color(color).name(name));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_violin(
        plot_ui: &mut PlotUi,
        name: &str,
        slot: usize,
        outline: &[[f64; 2]],
        stats: &BoxStats,
        points: &[f64],
        color: Color32,
    ) {
        let center = slot as f64;
        for pair in outline.windows(2) {
            let ([y0, w0], [y1, w1]) = (pair[0], pair[1]);
            let quad = vec![
                [center - w0, y0],
                [center + w0, y0],
                [center + w1, y1],
                [center - w1, y1],
            ];
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(quad))
                    .fill_color(color.gamma_multiply(0.35))
                    .stroke(Stroke::NONE)
                    .name(name),
            );
        }

        plot_ui.box_plot(BoxPlot::new(vec![Self::box_elem(slot, stats, 0.08, color)]).name(name));

        // all points, swarmed beside the violin
        let xs = Self::beeswarm_positions(points, center - 0.45, 0.08, 10.0);
        let swarm: PlotPoints = xs.iter().zip(points).map(|(&x, &y)| [x, y]).collect();
        plot_ui.points(Points::new(swarm).radius(2.0).color(color.gamma_multiply(0.8)).name(name));
    }

    fn draw_waterfall(plot_ui: &mut PlotUi, name: &str, steps: &[WaterfallStep], text: &[String]) {
        let bars: Vec<Bar> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let fill = match step.measure {
                    WaterfallMeasure::Total => TOTAL,
                    WaterfallMeasure::Relative if step.is_increase() => INCREASING,
                    WaterfallMeasure::Relative => DECREASING,
                };
                Bar::new(i as f64, step.delta())
                    .base_offset(step.base)
                    .width(0.6)
                    .fill(fill)
                    .stroke(Stroke::new(1.0, fill))
            })
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).name(name).color(TOTAL));

        // connector from each bar's end to the next bar
        for i in 1..steps.len() {
            let level = steps[i - 1].top;
            plot_ui.line(
                Line::new(PlotPoints::from(vec![[i as f64 - 0.7, level], [i as f64 - 0.3, level]]))
                    .color(CONNECTOR)
                    .width(1.0),
            );
        }

        for (i, (step, label)) in steps.iter().zip(text).enumerate() {
            let y = step.top.max(step.base);
            plot_ui.text(
                Text::new(PlotPoint::new(i as f64, y), RichText::new(label).size(12.0)).anchor(Align2::CENTER_BOTTOM),
            );
        }
    }

    fn draw_funnel(plot_ui: &mut PlotUi, values: &[f64]) {
        let color = Self::series_color(0);
        let bars: Vec<Bar> = values
            .iter()
            .enumerate()
            .map(|(slot, &v)| Bar::new(slot as f64, v).base_offset(-v / 2.0).width(0.8).fill(color))
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).horizontal().color(color));

        for (slot, &v) in values.iter().enumerate() {
            plot_ui.text(
                Text::new(
                    PlotPoint::new(0.0, slot as f64),
                    RichText::new(format!("{}", v)).size(13.0).color(Color32::WHITE),
                )
                .anchor(Align2::CENTER_CENTER),
            );
        }
    }

    fn draw_ohlc(plot_ui: &mut PlotUi, ohlc: &OhlcTrace) {
        let days = ohlc.x.len();
        for i in 0..days {
            let (x, open, high, low, close) = (ohlc.x[i], ohlc.open[i], ohlc.high[i], ohlc.low[i], ohlc.close[i]);
            let color = if close >= open { INCREASING } else { DECREASING };

            match ohlc.style {
                OhlcStyle::Candlestick => {
                    let body_low = open.min(close);
                    let body_high = open.max(close);
                    // generated walks are independent, so widen the wick to cover the body
                    let spread = BoxSpread::new(
                        low.min(body_low),
                        body_low,
                        body_high,
                        body_high,
                        high.max(body_high),
                    );
                    let elem = BoxElem::new(x, spread)
                        .box_width(0.6)
                        .whisker_width(0.0)
                        .fill(color.gamma_multiply(0.8))
                        .stroke(Stroke::new(1.0, color));
                    plot_ui.box_plot(BoxPlot::new(vec![elem]));
                }
                OhlcStyle::Bars => {
                    let stroke = |points: Vec<[f64; 2]>| Line::new(PlotPoints::from(points)).color(color).width(1.5);
                    plot_ui.line(stroke(vec![[x, low], [x, high]]));
                    plot_ui.line(stroke(vec![[x - 0.3, open], [x, open]]));
                    plot_ui.line(stroke(vec![[x, close], [x + 0.3, close]]));
                }
            }
        }
    }

    fn draw_geo(plot_ui: &mut PlotUi, geo: &GeoTrace) {
        let (lo, hi) = match &geo.color {
            GeoColor::Scale(values) => (
                values.iter().copied().fold(f64::INFINITY, f64::min),
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ),
            GeoColor::Discrete => (0.0, 1.0),
        };

        for (i, name) in geo.names.iter().enumerate() {
            let color = match &geo.color {
                GeoColor::Scale(values) if hi > lo => Self::scale_color((values[i] - lo) / (hi - lo)),
                GeoColor::Scale(_) => Self::scale_color(0.5),
                GeoColor::Discrete => Self::series_color(i),
            };
            let mut points = Points::new(PlotPoints::from(vec![[geo.lon[i], geo.lat[i]]]))
                .radius((geo.sizes[i] / 2.0).max(2.0) as f32)
                .color(color.gamma_multiply(0.85))
                .filled(true);
            if matches!(geo.color, GeoColor::Discrete) {
                points = points.name(name);
            }
            plot_ui.points(points);
            plot_ui.text(
                Text::new(PlotPoint::new(geo.lon[i] + 0.6, geo.lat[i]), RichText::new(name).size(11.0))
                    .anchor(Align2::LEFT_CENTER),
            );
        }
    }

    /// Outline of an (annular) sector split into convex pieces.
    fn sector_pieces(inner: f64, outer: f64, start: f64, end: f64) -> Vec<Vec<[f64; 2]>> {
        let span = end - start;
        let pieces = ((span.abs() / MAX_PIECE_ANGLE).ceil() as usize).max(1);
        let step = span / pieces as f64;
        (0..pieces)
            .map(|i| {
                let a = start + i as f64 * step;
                sector_polygon(inner, outer, a, a + step)
            })
            .collect()
    }

    fn fill_sector(plot_ui: &mut PlotUi, inner: f64, outer: f64, start: f64, end: f64, color: Color32, name: &str) {
        for piece in Self::sector_pieces(inner, outer, start, end) {
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(piece))
                    .fill_color(color)
                    .stroke(Stroke::new(0.5, color))
                    .name(name),
            );
        }
    }

    fn draw_pie(plot_ui: &mut PlotUi, labels: &[String], values: &[f64], hole: f64) {
        let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            return;
        }

        // clockwise from twelve o'clock
        let mut angle = FRAC_PI_2;
        for (i, (label, &value)) in labels.iter().zip(values).enumerate() {
            let span = value.max(0.0) / total * TAU;
            let color = Self::series_color(i);
            Self::fill_sector(plot_ui, hole, 1.0, angle - span, angle, color, label);

            let mid = angle - span / 2.0;
            let r = if hole > 0.0 { (hole + 1.0) / 2.0 } else { 0.65 };
            plot_ui.text(
                Text::new(
                    PlotPoint::new(r * mid.cos(), r * mid.sin()),
                    RichText::new(format!("{:.1}%", value / total * 100.0))
                        .size(12.0)
                        .color(Color32::WHITE),
                )
                .anchor(Align2::CENTER_CENTER),
            );

            plot_ui.line(
                Line::new(PlotPoints::from(vec![
                    [hole * angle.cos(), hole * angle.sin()],
                    [angle.cos(), angle.sin()],
                ]))
                .color(Color32::WHITE)
                .width(1.5),
            );
            angle -= span;
        }
    }

    fn draw_radar(plot_ui: &mut PlotUi, traces: &[&PolarTrace], range: (f64, f64)) {
        let Some(first) = traces.first() else {
            return;
        };
        let n = first.theta.len();
        if n == 0 {
            return;
        }
        let (r_min, r_max) = range;
        let span = (r_max - r_min).max(f64::EPSILON);
        let scale = |r: f64| ((r - r_min) / span).clamp(0.0, 1.0);
        let angle = |i: usize| i as f64 * TAU / n as f64;
        let grid_color = Color32::from_gray(160);

        // rings and spokes
        let ticks = (r_max - r_min).round().max(1.0) as usize;
        for k in 1..=ticks {
            let r = k as f64 / ticks as f64;
            let ring: PlotPoints = (0..=96)
                .map(|j| {
                    let a = j as f64 * TAU / 96.0;
                    [r * a.cos(), r * a.sin()]
                })
                .collect();
            plot_ui.line(Line::new(ring).color(grid_color.gamma_multiply(0.5)).width(0.5));
            plot_ui.text(
                Text::new(
                    PlotPoint::new(r, 0.0),
                    RichText::new(format!("{}", r_min + r * span)).size(10.0).color(grid_color),
                )
                .anchor(Align2::LEFT_TOP),
            );
        }
        for (i, label) in first.theta.iter().enumerate() {
            let a = angle(i);
            plot_ui.line(
                Line::new(PlotPoints::from(vec![[0.0, 0.0], [a.cos(), a.sin()]]))
                    .color(grid_color.gamma_multiply(0.5))
                    .width(0.5),
            );
            plot_ui.text(
                Text::new(PlotPoint::new(1.1 * a.cos(), 1.1 * a.sin()), RichText::new(label).size(13.0))
                    .anchor(Align2::CENTER_CENTER),
            );
        }

        for (t, trace) in traces.iter().enumerate() {
            let color = Self::series_color(t);
            let vertices: Vec<[f64; 2]> = trace
                .r
                .iter()
                .enumerate()
                .map(|(i, &r)| {
                    let (a, s) = (angle(i), scale(r));
                    [s * a.cos(), s * a.sin()]
                })
                .collect();

            if trace.fill {
                // triangles from the centre keep the star-shaped fill convex piecewise
                for i in 0..vertices.len() {
                    let next = vertices[(i + 1) % vertices.len()];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(vec![[0.0, 0.0], vertices[i], next]))
                            .fill_color(color.gamma_multiply(0.35))
                            .stroke(Stroke::NONE)
                            .name(&trace.name),
                    );
                }
            }

            let mut outline = vertices.clone();
            if let Some(&start) = vertices.first() {
                outline.push(start);
            }
            plot_ui.line(Line::new(PlotPoints::from(outline)).color(color).width(2.0).name(&trace.name));
            plot_ui.points(Points::new(PlotPoints::from(vertices)).radius(3.5).color(color).name(&trace.name));
        }
    }

    /// Colour of a hierarchy node: its root's palette colour, lighter with depth.
    fn node_color(nodes: &[HierNode], index: usize, roots: &[usize]) -> Color32 {
        let mut root = index;
        while let Some(parent) = nodes[root].parent {
            root = parent;
        }
        let root_pos = roots.iter().position(|&r| r == root).unwrap_or(0);
        Self::lighten(Self::series_color(root_pos), nodes[index].depth as f32 * 0.25)
    }

    fn draw_treemap(plot_ui: &mut PlotUi, nodes: &[HierNode]) {
        let bounds = Rect::new(0.0, 0.0, 16.0, 10.0);
        let rects = treemap_layout(nodes, bounds, 0.08, 0.5);
        let roots = children_of(nodes, None);

        for (i, node) in nodes.iter().enumerate() {
            let r = rects[i];
            if r.area() <= 0.0 {
                continue;
            }
            let color = Self::node_color(nodes, i, &roots);
            // plot y grows upwards; layout y grows downwards
            let top = bounds.h - r.y;
            let bottom = bounds.h - (r.y + r.h);
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(vec![
                    [r.x, bottom],
                    [r.x + r.w, bottom],
                    [r.x + r.w, top],
                    [r.x, top],
                ]))
                .fill_color(color)
                .stroke(Stroke::new(1.0, Color32::WHITE))
                .name(&node.id),
            );
            plot_ui.text(
                Text::new(
                    PlotPoint::new(r.x + 0.1, top - 0.05),
                    RichText::new(format!("{} {}", node.label, node.value)).size(12.0),
                )
                .anchor(Align2::LEFT_TOP),
            );
        }
    }

    fn draw_sunburst(plot_ui: &mut PlotUi, nodes: &[HierNode]) {
        let arcs = sunburst_layout(nodes);
        let roots = children_of(nodes, None);
        let levels = nodes.iter().map(|n| n.depth).max().unwrap_or(0) + 1;
        let ring = 1.0 / levels as f64;

        for (i, node) in nodes.iter().enumerate() {
            let arc = arcs[i];
            if arc.end <= arc.start {
                continue;
            }
            let inner = arc.depth as f64 * ring;
            let outer = inner + ring;
            let color = Self::node_color(nodes, i, &roots);
            // clockwise from twelve o'clock, like the pie
            let (start, end) = (FRAC_PI_2 - arc.end, FRAC_PI_2 - arc.start);
            Self::fill_sector(plot_ui, inner, outer, start, end, color, &node.id);

            plot_ui.line(
                Line::new(PlotPoints::from(vec![
                    [inner * end.cos(), inner * end.sin()],
                    [outer * end.cos(), outer * end.sin()],
                ]))
                .color(Color32::WHITE)
                .width(1.0),
            );

            if arc.end - arc.start > 0.2 {
                let mid = FRAC_PI_2 - arc.mid();
                let r = if inner == 0.0 { outer * 0.55 } else { (inner + outer) / 2.0 };
                plot_ui.text(
                    Text::new(PlotPoint::new(r * mid.cos(), r * mid.sin()), RichText::new(&node.label).size(11.0))
                        .anchor(Align2::CENTER_CENTER),
                );
            }
        }
    }
}

/// One grid mark per category slot.
fn category_marks(count: usize) -> Vec<GridMark> {
    (0..count)
        .map(|i| GridMark {
            value: i as f64,
            step_size: 1.0,
        })
        .collect()
}

fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Days since the Unix epoch as a calendar date.
pub fn format_day(day: f64) -> Option<String> {
    if !day.is_finite() {
        return None;
    }
    const UNIX_EPOCH_FROM_CE: i32 = 719_163;
    chrono::NaiveDate::from_num_days_from_ce_opt(day as i32 + UNIX_EPOCH_FROM_CE)
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn day_label(value: f64) -> String {
    if (value - value.round()).abs() > 1e-6 {
        return String::new();
    }
    format_day(value)
        .map(|d| d.get(5..).unwrap_or(&d).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(ChartPlotter::series_color(0), ChartPlotter::series_color(PALETTE.len()));
    }

    #[test]
    fn lighten_moves_towards_white() {
        let c = ChartPlotter::lighten(Color32::from_rgb(0, 100, 200), 0.5);
        assert_eq!(c, Color32::from_rgb(128, 178, 228));
        assert_eq!(ChartPlotter::lighten(Color32::BLACK, 1.0), Color32::from_rgb(255, 255, 255));
    }

    #[test]
    fn scale_endpoints() {
        assert_eq!(ChartPlotter::scale_color(0.0), SCALE[0]);
        assert_eq!(ChartPlotter::scale_color(1.0), SCALE[4]);
        assert_eq!(ChartPlotter::scale_color(0.5), SCALE[2]);
        assert_eq!(ChartPlotter::scale_color(f64::NAN), SCALE[0]);
    }

    #[test]
    fn beeswarm_spreads_duplicates() {
        let xs = ChartPlotter::beeswarm_positions(&[1.0, 1.0, 2.0], 0.0, 0.4, 10.0);
        assert!((xs[0] + 0.2).abs() < 1e-9);
        assert!((xs[1] - 0.2).abs() < 1e-9);
        assert_eq!(xs[2], 0.0);
    }

    #[test]
    fn sector_pieces_cover_span() {
        let pieces = ChartPlotter::sector_pieces(0.4, 1.0, 0.0, TAU);
        assert_eq!(pieces.len(), 120);
        let single = ChartPlotter::sector_pieces(0.0, 1.0, 0.0, MAX_PIECE_ANGLE / 2.0);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn category_labels_only_on_slots() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&labels, 1.0), "B");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn days_format_as_dates() {
        assert_eq!(format_day(19_358.0).as_deref(), Some("2023-01-01"));
        assert_eq!(day_label(19_359.0), "01-02");
        assert_eq!(day_label(19_359.5), "");
        assert!(format_day(f64::NAN).is_none());
    }
}
