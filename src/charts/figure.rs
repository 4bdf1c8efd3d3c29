//! Figure descriptions produced by the dispatcher and drawn by the plotter.

use crate::charts::geometry::{Bin, BoxStats, HierNode, WaterfallStep};

/// How an axis labels its ticks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AxisScale {
    #[default]
    Numeric,
    /// Tick `i` shows `labels[i]`
    Category(Vec<String>),
    /// Values are days since the Unix epoch
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Group,
    Stack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarTrace {
    pub name: String,
    /// Index into the figure's category axis for each value
    pub slots: Vec<usize>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub markers: bool,
    /// Lower edge of a filled band (stacked area)
    pub base: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Marker diameters in points; `None` means uniform markers
    pub sizes: Option<Vec<f64>>,
    pub hover: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolarTrace {
    pub name: String,
    pub theta: Vec<String>,
    pub r: Vec<f64>,
    pub fill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyStyle {
    Treemap,
    Sunburst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OhlcStyle {
    Candlestick,
    Bars,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcTrace {
    pub style: OhlcStyle,
    pub x: Vec<f64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

/// Marker colouring for geographic scatters.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoColor {
    /// Continuous colour scale over these values
    Scale(Vec<f64>),
    /// One palette colour per point, with a legend entry each
    Discrete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoTrace {
    pub names: Vec<String>,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub sizes: Vec<f64>,
    pub color: GeoColor,
}

/// A single series within a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Bar(BarTrace),
    Line(LineTrace),
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
        hole: f64,
    },
    Scatter(ScatterTrace),
    Polar(PolarTrace),
    Hierarchy {
        style: HierarchyStyle,
        nodes: Vec<HierNode>,
    },
    Histogram {
        name: String,
        bins: Vec<Bin>,
    },
    Box {
        name: String,
        slot: usize,
        stats: BoxStats,
    },
    Violin {
        name: String,
        slot: usize,
        /// (value, half-width) pairs, widths already scaled to the slot
        outline: Vec<[f64; 2]>,
        stats: BoxStats,
        points: Vec<f64>,
    },
    Waterfall {
        name: String,
        steps: Vec<WaterfallStep>,
        text: Vec<String>,
    },
    Funnel {
        values: Vec<f64>,
    },
    Ohlc(OhlcTrace),
    Geo(GeoTrace),
}

impl Trace {
    /// Short name of the trace type, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Trace::Bar(_) => "bar",
            Trace::Line(_) => "line",
            Trace::Pie { .. } => "pie",
            Trace::Scatter(_) => "scatter",
            Trace::Polar(_) => "scatterpolar",
            Trace::Hierarchy {
                style: HierarchyStyle::Treemap,
                ..
            } => "treemap",
            Trace::Hierarchy {
                style: HierarchyStyle::Sunburst,
                ..
            } => "sunburst",
            Trace::Histogram { .. } => "histogram",
            Trace::Box { .. } => "box",
            Trace::Violin { .. } => "violin",
            Trace::Waterfall { .. } => "waterfall",
            Trace::Funnel { .. } => "funnel",
            Trace::Ohlc(OhlcTrace {
                style: OhlcStyle::Candlestick,
                ..
            }) => "candlestick",
            Trace::Ohlc(_) => "ohlc",
            Trace::Geo(_) => "scattergeo",
        }
    }
}

/// One chart: a title, axes and its traces.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub id: String,
    /// Subheader shown above the chart, if any
    pub heading: Option<String>,
    pub title: String,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub x_axis: AxisScale,
    pub y_axis: AxisScale,
    pub bar_mode: BarMode,
    pub orientation: Orientation,
    /// Fixed radial range for polar figures
    pub radial_range: Option<(f64, f64)>,
    pub show_legend: bool,
    pub traces: Vec<Trace>,
}

impl Figure {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            heading: None,
            title: title.into(),
            x_title: None,
            y_title: None,
            x_axis: AxisScale::Numeric,
            y_axis: AxisScale::Numeric,
            bar_mode: BarMode::Group,
            orientation: Orientation::Vertical,
            radial_range: None,
            show_legend: true,
            traces: Vec::new(),
        }
    }

    pub fn with_axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = Some(x.into());
        self.y_title = Some(y.into());
        self
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn category_labels(&self) -> &[String] {
        match (&self.x_axis, &self.y_axis) {
            (AxisScale::Category(labels), _) | (_, AxisScale::Category(labels)) => labels,
            _ => &[],
        }
    }
}
