//! Chart Dispatcher Module
//! Maps a chart-type selection to its figures and its data preview.

use crate::charts::figure::{
    AxisScale, BarMode, BarTrace, Figure, GeoColor, GeoTrace, HierarchyStyle, LineTrace,
    OhlcStyle, OhlcTrace, Orientation, PolarTrace, ScatterTrace, Trace,
};
use crate::charts::geometry::{
    aggregate_hierarchy, box_stats, bubble_diameters, gaussian_kde, histogram,
    histogram_with_width, linspace, to_density, waterfall_steps, WaterfallMeasure,
};
use crate::charts::ChartKind;
use crate::data::{DatasetKey, GeneratorError, SampleData};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

const HIST_BINS: usize = 30;
const DISTPLOT_BIN_SIZE: f64 = 0.2;
const DISTPLOT_SERIES: usize = 3;
const DISTPLOT_SAMPLES: usize = 1000;
const KDE_POINTS: usize = 500;
const VIOLIN_POINTS: usize = 100;
const VIOLIN_HALF_WIDTH: f64 = 0.4;
const BUBBLE_SIZE_MAX: f64 = 60.0;
const GEO_SIZE_MAX: f64 = 20.0;
const DONUT_HOLE: f64 = 0.4;
const RADAR_RANGE: (f64, f64) = (0.0, 6.0);
const HIST_NOTE: &str = "数据为1000个随机值";
const SERIES_NAMES: [&str; 3] = ["系列1", "系列2", "系列3"];

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown chart type: {0}")]
    UnknownChart(String),
    #[error("Dataset '{0}' not generated")]
    MissingDataset(&'static str),
    #[error("Column '{column}' missing from dataset '{dataset}'")]
    MissingColumn {
        dataset: &'static str,
        column: String,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// How the backing table is shown under the charts.
#[derive(Debug, Clone, PartialEq)]
pub enum TablePreview {
    Table,
    Note(String),
    Hidden,
}

/// Everything the central panel shows for one selection.
#[derive(Debug, Clone)]
pub struct ChartPage {
    pub kind: ChartKind,
    pub heading: String,
    pub subheading: String,
    pub description: String,
    pub figures: Vec<Figure>,
    /// The table the figures were built from
    pub source: DataFrame,
    pub preview: TablePreview,
}

/// Stateless mapping from selection to page.
pub struct ChartDispatcher;

impl ChartDispatcher {
    pub fn dispatch_label(label: &str, data: &SampleData) -> Result<ChartPage, DispatchError> {
        let kind =
            ChartKind::from_label(label).ok_or_else(|| DispatchError::UnknownChart(label.to_string()))?;
        Self::dispatch(kind, data)
    }

    pub fn dispatch(kind: ChartKind, data: &SampleData) -> Result<ChartPage, DispatchError> {
        let source = match kind.dataset() {
            Some(key) => Self::table(data, key)?.clone(),
            None => radar_table()?,
        };
        let src = Source {
            df: &source,
            dataset: kind.dataset().map(DatasetKey::name).unwrap_or("radar"),
        };

        let figures = match kind {
            ChartKind::Bar => Self::bar_figures(&src)?,
            ChartKind::HorizontalBar => vec![Self::horizontal_bar_figure(&src)?],
            ChartKind::Line => Self::line_figures(&src)?,
            ChartKind::Area => vec![Self::area_figure(&src)?],
            ChartKind::Pie => vec![Self::pie_figure(&src, "pie", "饼图示例", 0.0)?],
            ChartKind::Donut => vec![Self::pie_figure(&src, "donut", "圆环图示例", DONUT_HOLE)?],
            ChartKind::Scatter => vec![Self::scatter_figure(&src, false)?],
            ChartKind::Bubble => vec![Self::scatter_figure(&src, true)?],
            ChartKind::Polar => vec![Self::radar_figure(&src)?],
            ChartKind::Treemap => vec![Self::hierarchy_figure(&src, HierarchyStyle::Treemap)?],
            ChartKind::Sunburst => vec![Self::hierarchy_figure(&src, HierarchyStyle::Sunburst)?],
            ChartKind::Histogram => Self::histogram_figures(&src, data)?,
            ChartKind::Box => Self::box_figures(&src)?,
            ChartKind::Waterfall => vec![Self::waterfall_figure(&src)?],
            ChartKind::Funnel => vec![Self::funnel_figure(&src)?],
            ChartKind::Stock => Self::stock_figures(&src)?,
            ChartKind::Map => Self::map_figures(&src)?,
        };

        let preview = match kind {
            ChartKind::Histogram => TablePreview::Note(HIST_NOTE.to_string()),
            ChartKind::Polar => TablePreview::Hidden,
            _ => TablePreview::Table,
        };

        tracing::info!(
            chart = kind.label(),
            figures = figures.len(),
            traces = figures.iter().map(|f| f.traces.len()).sum::<usize>(),
            rows = source.height(),
            "chart page built"
        );
        for figure in &figures {
            let kinds: Vec<&str> = figure.traces.iter().map(Trace::kind_name).collect();
            tracing::debug!(figure = %figure.id, traces = ?kinds, "figure");
        }

        Ok(ChartPage {
            kind,
            heading: format!("{}示例", kind.label()),
            subheading: kind.subheading(),
            description: kind.description().to_string(),
            figures,
            source,
            preview,
        })
    }

    fn table(data: &SampleData, key: DatasetKey) -> Result<&DataFrame, DispatchError> {
        data.get(key).ok_or(DispatchError::MissingDataset(key.name()))
    }

    fn bar_traces(src: &Source) -> Result<(Vec<String>, Vec<Trace>), DispatchError> {
        let categories = src.strings("category")?;
        let values = src.floats("value")?;
        let groups = src.strings("group")?;

        let axis = unique_in_order(&categories);
        let traces = unique_in_order(&groups)
            .into_iter()
            .map(|group| {
                let (slots, values): (Vec<usize>, Vec<f64>) = groups
                    .iter()
                    .zip(categories.iter().zip(&values))
                    .filter(|(g, _)| **g == group)
                    .map(|(_, (c, v))| (slot_of(&axis, c), *v))
                    .unzip();
                Trace::Bar(BarTrace {
                    name: group,
                    slots,
                    values,
                })
            })
            .collect();

        Ok((axis, traces))
    }

    fn bar_figures(src: &Source) -> Result<Vec<Figure>, DispatchError> {
        let (axis, traces) = Self::bar_traces(src)?;

        let mut grouped = Figure::new("bar_group", "分组柱状图示例").with_axis_titles("类别", "值");
        grouped.x_axis = AxisScale::Category(axis.clone());
        grouped.bar_mode = BarMode::Group;
        grouped.traces = traces.clone();

        let mut stacked = Figure::new("bar_stack", "堆叠柱状图示例").with_axis_titles("类别", "值");
        stacked.x_axis = AxisScale::Category(axis);
        stacked.bar_mode = BarMode::Stack;
        stacked.traces = traces;

        Ok(vec![grouped, stacked])
    }

    fn horizontal_bar_figure(src: &Source) -> Result<Figure, DispatchError> {
        let (axis, traces) = Self::bar_traces(src)?;

        let mut figure = Figure::new("bar_horizontal", "条形图示例").with_axis_titles("值", "类别");
        figure.y_axis = AxisScale::Category(axis);
        figure.orientation = Orientation::Horizontal;
        // colour groups stack when no bar mode is given
        figure.bar_mode = BarMode::Stack;
        figure.traces = traces;
        Ok(figure)
    }

    fn line_series(src: &Source) -> Result<(Vec<f64>, Vec<Vec<f64>>), DispatchError> {
        let x = src.days("date")?;
        let series = ["series1", "series2", "series3"]
            .iter()
            .map(|name| src.floats(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((x, series))
    }

    fn line_figures(src: &Source) -> Result<Vec<Figure>, DispatchError> {
        let (x, series) = Self::line_series(src)?;

        let mut multi = Figure::new("line_multi", "多系列折线图示例").with_axis_titles("日期", "数值");
        multi.x_axis = AxisScale::Date;
        multi.traces = SERIES_NAMES
            .iter()
            .zip(&series)
            .map(|(name, y)| {
                Trace::Line(LineTrace {
                    name: name.to_string(),
                    x: x.clone(),
                    y: y.clone(),
                    markers: false,
                    base: None,
                })
            })
            .collect();

        let mut marked = Figure::new("line_markers", "带标记点的折线图示例")
            .with_axis_titles("日期", SERIES_NAMES[0]);
        marked.x_axis = AxisScale::Date;
        marked.show_legend = false;
        marked.traces.push(Trace::Line(LineTrace {
            name: SERIES_NAMES[0].to_string(),
            x,
            y: series[0].clone(),
            markers: true,
            base: None,
        }));

        Ok(vec![multi, marked])
    }

    fn area_figure(src: &Source) -> Result<Figure, DispatchError> {
        let (x, series) = Self::line_series(src)?;

        let mut figure = Figure::new("area_stack", "堆叠面积图示例").with_axis_titles("日期", "数值");
        figure.x_axis = AxisScale::Date;

        let mut base = vec![0.0; x.len()];
        for (name, y) in SERIES_NAMES.iter().zip(&series) {
            let top: Vec<f64> = base.iter().zip(y).map(|(b, v)| b + v).collect();
            figure.traces.push(Trace::Line(LineTrace {
                name: name.to_string(),
                x: x.clone(),
                y: top.clone(),
                markers: false,
                base: Some(base),
            }));
            base = top;
        }
        Ok(figure)
    }

    fn pie_figure(src: &Source, id: &str, title: &str, hole: f64) -> Result<Figure, DispatchError> {
        Ok(Figure::new(id, title).with_trace(Trace::Pie {
            labels: src.strings("item")?,
            values: src.floats("share")?,
            hole,
        }))
    }

    fn scatter_figure(src: &Source, bubble: bool) -> Result<Figure, DispatchError> {
        let x = src.floats("x")?;
        let y = src.floats("y")?;
        let kinds = src.strings("kind")?;
        // sizes are scaled over the whole table, then split by colour
        let sizes = bubble_diameters(&src.floats("size")?, BUBBLE_SIZE_MAX);

        let (id, title) = if bubble {
            ("bubble", "气泡图示例")
        } else {
            ("scatter", "散点图示例")
        };
        let mut figure = Figure::new(id, title).with_axis_titles("X值", "Y值");

        for kind in unique_in_order(&kinds) {
            let rows: Vec<usize> = (0..kinds.len()).filter(|&i| kinds[i] == kind).collect();
            figure.traces.push(Trace::Scatter(ScatterTrace {
                name: kind.clone(),
                x: rows.iter().map(|&i| x[i]).collect(),
                y: rows.iter().map(|&i| y[i]).collect(),
                sizes: bubble.then(|| rows.iter().map(|&i| sizes[i]).collect()),
                hover: vec![kind; rows.len()],
            }));
        }
        Ok(figure)
    }

    fn radar_figure(src: &Source) -> Result<Figure, DispatchError> {
        let theta = src.strings("category")?;
        let mut figure = Figure::new("radar", "雷达图示例");
        figure.radial_range = Some(RADAR_RANGE);
        for (column, name) in ["series1", "series2"].iter().zip(SERIES_NAMES) {
            figure.traces.push(Trace::Polar(PolarTrace {
                name: name.to_string(),
                theta: theta.clone(),
                r: src.floats(column)?,
                fill: true,
            }));
        }
        Ok(figure)
    }

    fn hierarchy_figure(src: &Source, style: HierarchyStyle) -> Result<Figure, DispatchError> {
        let country = src.strings("country")?;
        let category = src.strings("category")?;
        let subcategory = src.strings("subcategory")?;
        let sales = src.floats("sales")?;

        let paths: Vec<Vec<String>> = country
            .into_iter()
            .zip(category)
            .zip(subcategory)
            .map(|((a, b), c)| vec![a, b, c])
            .collect();

        let (id, title) = match style {
            HierarchyStyle::Treemap => ("treemap", "树状图示例"),
            HierarchyStyle::Sunburst => ("sunburst", "旭日图示例"),
        };
        let mut figure = Figure::new(id, title).with_trace(Trace::Hierarchy {
            style,
            nodes: aggregate_hierarchy(&paths, &sales),
        });
        figure.show_legend = false;
        Ok(figure)
    }

    fn histogram_figures(src: &Source, data: &SampleData) -> Result<Vec<Figure>, DispatchError> {
        let values = src.floats("value")?;
        let mut single = Figure::new("histogram", "直方图示例")
            .with_axis_titles("值", "频率")
            .with_trace(Trace::Histogram {
                name: "count".to_string(),
                bins: histogram(&values, HIST_BINS),
            });
        single.show_legend = false;

        let samples = data.distribution_samples(DISTPLOT_SERIES, DISTPLOT_SAMPLES)?;
        let mut dist = Figure::new("distplot", "多系列分布图示例");

        // per-series density work is independent
        let layers: Vec<(Trace, Trace)> = samples
            .par_iter()
            .zip(SERIES_NAMES.par_iter())
            .map(|(series, name)| {
                let bins = to_density(&histogram_with_width(series, DISTPLOT_BIN_SIZE));
                let lo = bins.first().map(|b| b.start).unwrap_or(0.0);
                let hi = bins.last().map(|b| b.end).unwrap_or(0.0);
                let grid = linspace(lo, hi, KDE_POINTS);
                let density = gaussian_kde(series, &grid);
                (
                    Trace::Histogram {
                        name: name.to_string(),
                        bins,
                    },
                    Trace::Line(LineTrace {
                        name: name.to_string(),
                        x: grid,
                        y: density,
                        markers: false,
                        base: None,
                    }),
                )
            })
            .collect();
        let (hists, curves): (Vec<Trace>, Vec<Trace>) = layers.into_iter().unzip();
        dist.traces.extend(hists);
        dist.traces.extend(curves);

        Ok(vec![single, dist])
    }

    fn box_figures(src: &Source) -> Result<Vec<Figure>, DispatchError> {
        let categories = src.strings("category")?;
        let values = src.floats("value")?;
        let axis = unique_in_order(&categories);

        let groups: Vec<(usize, String, Vec<f64>)> = axis
            .iter()
            .enumerate()
            .map(|(slot, c)| {
                let vals = categories
                    .iter()
                    .zip(&values)
                    .filter(|(cat, _)| *cat == c)
                    .map(|(_, v)| *v)
                    .collect();
                (slot, c.clone(), vals)
            })
            .collect();

        let mut boxes = Figure::new("box", "箱线图示例").with_axis_titles("类别", "数值");
        boxes.x_axis = AxisScale::Category(axis.clone());
        boxes.show_legend = false;
        for (slot, name, vals) in &groups {
            if let Some(stats) = box_stats(vals) {
                boxes.traces.push(Trace::Box {
                    name: name.clone(),
                    slot: *slot,
                    stats,
                });
            }
        }

        let mut violins = Figure::new("violin", "小提琴图示例").with_axis_titles("类别", "数值");
        violins.x_axis = AxisScale::Category(axis);
        violins.show_legend = false;
        let traces: Vec<Option<Trace>> = groups
            .par_iter()
            .map(|(slot, name, vals)| {
                let stats = box_stats(vals)?;
                Some(Trace::Violin {
                    name: name.clone(),
                    slot: *slot,
                    outline: violin_outline(vals),
                    stats,
                    points: vals.clone(),
                })
            })
            .collect();
        violins.traces.extend(traces.into_iter().flatten());

        Ok(vec![boxes, violins])
    }

    fn waterfall_figure(src: &Source) -> Result<Figure, DispatchError> {
        let items = src.strings("item")?;
        let amounts = src.floats("amount")?;

        // every entry is a change except the closing total
        let measures: Vec<WaterfallMeasure> = (0..amounts.len())
            .map(|i| {
                if i + 1 == amounts.len() {
                    WaterfallMeasure::Total
                } else {
                    WaterfallMeasure::Relative
                }
            })
            .collect();

        let mut figure = Figure::new("waterfall", "瀑布图示例 - 财务数据").with_trace(Trace::Waterfall {
            name: "财务数据".to_string(),
            steps: waterfall_steps(&amounts, &measures),
            text: amounts.iter().map(|v| format!("{}", v)).collect(),
        });
        figure.x_axis = AxisScale::Category(items);
        Ok(figure)
    }

    fn funnel_figure(src: &Source) -> Result<Figure, DispatchError> {
        // first stage on top: slots count up from the bottom
        let mut stages = src.strings("stage")?;
        let mut users = src.floats("users")?;
        stages.reverse();
        users.reverse();

        let mut figure = Figure::new("funnel", "漏斗图示例")
            .with_axis_titles("用户数", "阶段")
            .with_trace(Trace::Funnel { values: users });
        figure.y_axis = AxisScale::Category(stages);
        figure.orientation = Orientation::Horizontal;
        figure.show_legend = false;
        Ok(figure)
    }

    fn stock_figures(src: &Source) -> Result<Vec<Figure>, DispatchError> {
        let ohlc = |style: OhlcStyle| -> Result<OhlcTrace, DispatchError> {
            Ok(OhlcTrace {
                style,
                x: src.days("date")?,
                open: src.floats("open")?,
                high: src.floats("high")?,
                low: src.floats("low")?,
                close: src.floats("close")?,
            })
        };

        let mut candles = Figure::new("candlestick", "股价图示例")
            .with_axis_titles("日期", "价格")
            .with_trace(Trace::Ohlc(ohlc(OhlcStyle::Candlestick)?));
        candles.x_axis = AxisScale::Date;
        candles.show_legend = false;

        let mut bars = Figure::new("ohlc", "OHLC图示例")
            .with_heading("OHLC图")
            .with_axis_titles("日期", "价格")
            .with_trace(Trace::Ohlc(ohlc(OhlcStyle::Bars)?));
        bars.x_axis = AxisScale::Date;
        bars.show_legend = false;

        Ok(vec![candles, bars])
    }

    fn map_figures(src: &Source) -> Result<Vec<Figure>, DispatchError> {
        let names = src.strings("city")?;
        let lon = src.floats("lon")?;
        let lat = src.floats("lat")?;
        let amount = src.floats("amount")?;
        let sizes = bubble_diameters(&amount, GEO_SIZE_MAX);

        let mut scatter = Figure::new("scatter_map", "散点地图示例")
            .with_axis_titles("经度", "纬度")
            .with_trace(Trace::Geo(GeoTrace {
                names: names.clone(),
                lon: lon.clone(),
                lat: lat.clone(),
                sizes: sizes.clone(),
                color: GeoColor::Scale(amount),
            }));
        scatter.show_legend = false;

        let bubble = Figure::new("bubble_map", "气泡地图示例")
            .with_heading("气泡地图")
            .with_axis_titles("经度", "纬度")
            .with_trace(Trace::Geo(GeoTrace {
                names,
                lon,
                lat,
                sizes,
                color: GeoColor::Discrete,
            }));

        Ok(vec![scatter, bubble])
    }
}

/// The table a figure reads from, with column access that names the dataset on failure.
struct Source<'a> {
    df: &'a DataFrame,
    dataset: &'static str,
}

impl Source<'_> {
    fn column(&self, name: &str) -> Result<&Column, DispatchError> {
        self.df.column(name).map_err(|_| DispatchError::MissingColumn {
            dataset: self.dataset,
            column: name.to_string(),
        })
    }

    fn floats(&self, name: &str) -> Result<Vec<f64>, DispatchError> {
        let col = self.column(name)?.cast(&DataType::Float64)?;
        Ok(col.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }

    fn strings(&self, name: &str) -> Result<Vec<String>, DispatchError> {
        let col = self.column(name)?;
        Ok(col
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    /// Date column as days since the Unix epoch.
    fn days(&self, name: &str) -> Result<Vec<f64>, DispatchError> {
        let col = self.column(name)?.cast(&DataType::Int32)?;
        Ok(col.i32()?.into_iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    }
}

fn radar_table() -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new("category".into(), ["A", "B", "C", "D", "E"]),
        Column::new("series1".into(), [4.0, 3.0, 2.0, 5.0, 1.0]),
        Column::new("series2".into(), [3.0, 1.0, 4.0, 2.0, 5.0]),
    ])
}

fn unique_in_order(values: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for v in values {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    seen
}

fn slot_of(axis: &[String], value: &str) -> usize {
    axis.iter().position(|a| a == value).unwrap_or(0)
}

/// Mirror-ready KDE outline, widest point scaled to the violin half width.
fn violin_outline(values: &[f64]) -> Vec<[f64; 2]> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let grid = linspace(lo, hi, VIOLIN_POINTS);
    let density = gaussian_kde(values, &grid);
    let peak = density.iter().copied().fold(0.0, f64::max);
    if peak <= 0.0 {
        return Vec::new();
    }
    grid.into_iter()
        .zip(density)
        .map(|(y, d)| [y, d / peak * VIOLIN_HALF_WIDTH])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::Trace;
    use crate::data::{SampleDataGenerator, HIST_SAMPLES};

    fn data() -> SampleData {
        SampleDataGenerator::new(42).generate().unwrap()
    }

    #[test]
    fn every_label_dispatches() {
        let data = data();
        for kind in ChartKind::ALL {
            let page = ChartDispatcher::dispatch_label(kind.label(), &data)
                .unwrap_or_else(|e| panic!("{} failed: {}", kind.label(), e));
            assert_eq!(page.kind, kind);
            assert!(page.source.height() > 0, "{} has empty table", kind.label());
            assert!(!page.figures.is_empty(), "{} has no figures", kind.label());
            for figure in &page.figures {
                assert!(!figure.traces.is_empty(), "{} / {} has no traces", kind.label(), figure.id);
            }
            assert_eq!(page.heading, format!("{}示例", kind.label()));
        }
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = ChartDispatcher::dispatch_label("雷达", &data()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownChart(_)));
    }

    #[test]
    fn bar_page_uses_bar_table() {
        let page = ChartDispatcher::dispatch(ChartKind::Bar, &data()).unwrap();
        let names: Vec<String> = page.source.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["category", "value", "group"]);
        assert_eq!(page.source.height(), 10);
        assert_eq!(page.preview, TablePreview::Table);

        assert_eq!(page.figures.len(), 2);
        assert_eq!(page.figures[0].bar_mode, BarMode::Group);
        assert_eq!(page.figures[1].bar_mode, BarMode::Stack);
        assert_eq!(page.figures[0].category_labels(), ["A", "B", "C", "D", "E"]);
        let group_names: Vec<&str> = page.figures[0]
            .traces
            .iter()
            .map(|t| match t {
                Trace::Bar(b) => b.name.as_str(),
                _ => panic!("expected bar trace"),
            })
            .collect();
        assert_eq!(group_names, ["组1", "组2"]);
    }

    #[test]
    fn histogram_page_has_1000_samples_and_note() {
        let page = ChartDispatcher::dispatch(ChartKind::Histogram, &data()).unwrap();
        assert_eq!(page.source.height(), HIST_SAMPLES);
        assert_eq!(page.source.column("value").unwrap().dtype(), &DataType::Float64);
        assert_eq!(page.preview, TablePreview::Note(HIST_NOTE.to_string()));

        match &page.figures[0].traces[0] {
            Trace::Histogram { bins, .. } => {
                assert_eq!(bins.len(), HIST_BINS);
                let total: f64 = bins.iter().map(|b| b.value).sum();
                assert_eq!(total as usize, HIST_SAMPLES);
            }
            other => panic!("unexpected trace {:?}", other.kind_name()),
        }
        // three density histograms and three curves
        assert_eq!(page.figures[1].traces.len(), 2 * DISTPLOT_SERIES);
    }

    #[test]
    fn polar_page_hides_table() {
        let page = ChartDispatcher::dispatch(ChartKind::Polar, &data()).unwrap();
        assert_eq!(page.preview, TablePreview::Hidden);
        assert_eq!(page.figures[0].radial_range, Some((0.0, 6.0)));
        match &page.figures[0].traces[0] {
            Trace::Polar(p) => assert_eq!(p.r, vec![4.0, 3.0, 2.0, 5.0, 1.0]),
            _ => panic!("expected polar trace"),
        }
    }

    #[test]
    fn area_traces_stack() {
        let page = ChartDispatcher::dispatch(ChartKind::Area, &data()).unwrap();
        let traces: Vec<&LineTrace> = page.figures[0]
            .traces
            .iter()
            .filter_map(|t| match t {
                Trace::Line(l) => Some(l),
                _ => None,
            })
            .collect();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[1].base.as_ref().unwrap(), &traces[0].y);
        assert_eq!(traces[2].base.as_ref().unwrap(), &traces[1].y);
    }

    #[test]
    fn donut_has_hole() {
        let page = ChartDispatcher::dispatch(ChartKind::Donut, &data()).unwrap();
        match &page.figures[0].traces[0] {
            Trace::Pie { hole, labels, .. } => {
                assert_eq!(*hole, DONUT_HOLE);
                assert_eq!(labels.len(), 5);
            }
            _ => panic!("expected pie trace"),
        }
    }

    #[test]
    fn bubble_sizes_only_for_bubble() {
        let data = data();
        let scatter = ChartDispatcher::dispatch(ChartKind::Scatter, &data).unwrap();
        let bubble = ChartDispatcher::dispatch(ChartKind::Bubble, &data).unwrap();
        let points = |page: &ChartPage| -> usize {
            page.figures[0]
                .traces
                .iter()
                .map(|t| match t {
                    Trace::Scatter(s) => s.x.len(),
                    _ => 0,
                })
                .sum()
        };
        assert_eq!(points(&scatter), 50);
        assert_eq!(points(&bubble), 50);
        assert!(scatter.figures[0].traces.iter().all(|t| matches!(t, Trace::Scatter(s) if s.sizes.is_none())));
        let max = bubble.figures[0]
            .traces
            .iter()
            .filter_map(|t| match t {
                Trace::Scatter(s) => s.sizes.clone(),
                _ => None,
            })
            .flatten()
            .fold(0.0, f64::max);
        assert!((max - BUBBLE_SIZE_MAX).abs() < 1e-9);
    }

    #[test]
    fn waterfall_closes_on_net_profit() {
        let page = ChartDispatcher::dispatch(ChartKind::Waterfall, &data()).unwrap();
        match &page.figures[0].traces[0] {
            Trace::Waterfall { steps, text, .. } => {
                let last = steps.last().unwrap();
                assert_eq!(last.measure, WaterfallMeasure::Total);
                assert_eq!(last.top, 250.0);
                assert_eq!(text[0], "1000");
                assert_eq!(text[1], "-400");
            }
            _ => panic!("expected waterfall trace"),
        }
    }

    #[test]
    fn funnel_first_stage_on_top() {
        let page = ChartDispatcher::dispatch(ChartKind::Funnel, &data()).unwrap();
        let labels = page.figures[0].category_labels();
        assert_eq!(labels.last().map(String::as_str), Some("访问"));
        match &page.figures[0].traces[0] {
            Trace::Funnel { values } => assert_eq!(values.last(), Some(&1000.0)),
            _ => panic!("expected funnel trace"),
        }
    }

    #[test]
    fn hierarchy_totals_match_sales() {
        let page = ChartDispatcher::dispatch(ChartKind::Sunburst, &data()).unwrap();
        match &page.figures[0].traces[0] {
            Trace::Hierarchy { nodes, style } => {
                assert_eq!(*style, HierarchyStyle::Sunburst);
                let roots: f64 = nodes.iter().filter(|n| n.parent.is_none()).map(|n| n.value).sum();
                assert_eq!(roots, 720.0);
                assert_eq!(nodes.iter().filter(|n| n.depth == 2).count(), 8);
            }
            _ => panic!("expected hierarchy trace"),
        }
    }

    #[test]
    fn stock_and_map_have_two_figures() {
        let data = data();
        let stock = ChartDispatcher::dispatch(ChartKind::Stock, &data).unwrap();
        assert_eq!(stock.figures.len(), 2);
        assert_eq!(stock.figures[1].heading.as_deref(), Some("OHLC图"));
        match &stock.figures[0].traces[0] {
            Trace::Ohlc(o) => {
                assert_eq!(o.x.len(), 20);
                assert_eq!(o.x[0], f64::from(crate::data::START_DAY));
            }
            _ => panic!("expected ohlc trace"),
        }

        let map = ChartDispatcher::dispatch(ChartKind::Map, &data).unwrap();
        assert_eq!(map.figures.len(), 2);
        assert!(matches!(&map.figures[0].traces[0], Trace::Geo(g) if matches!(g.color, GeoColor::Scale(_))));
        assert!(matches!(&map.figures[1].traces[0], Trace::Geo(g) if g.color == GeoColor::Discrete));
    }

    #[test]
    fn violins_cover_each_category() {
        let page = ChartDispatcher::dispatch(ChartKind::Box, &data()).unwrap();
        assert_eq!(page.figures[1].traces.len(), 3);
        for trace in &page.figures[1].traces {
            match trace {
                Trace::Violin { outline, points, .. } => {
                    assert_eq!(outline.len(), VIOLIN_POINTS);
                    assert_eq!(points.len(), 100);
                    let widest = outline.iter().map(|p| p[1]).fold(0.0, f64::max);
                    assert!((widest - VIOLIN_HALF_WIDTH).abs() < 1e-9);
                }
                _ => panic!("expected violin trace"),
            }
        }
    }

    #[test]
    fn missing_column_names_dataset() {
        let df = DataFrame::new(vec![Column::new("other".into(), [1.0])]).unwrap();
        let src = Source {
            df: &df,
            dataset: "bar",
        };
        let err = src.floats("value").unwrap_err();
        assert_eq!(err.to_string(), "Column 'value' missing from dataset 'bar'");
    }
}
