//! Chart types offered in the sidebar.

use crate::data::DatasetKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Line,
    Area,
    Pie,
    Donut,
    Scatter,
    Bubble,
    Polar,
    Treemap,
    Sunburst,
    Histogram,
    Box,
    Waterfall,
    Funnel,
    Stock,
    Map,
}

impl ChartKind {
    /// Sidebar order.
    pub const ALL: [ChartKind; 17] = [
        ChartKind::Bar,
        ChartKind::HorizontalBar,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Pie,
        ChartKind::Donut,
        ChartKind::Scatter,
        ChartKind::Bubble,
        ChartKind::Polar,
        ChartKind::Treemap,
        ChartKind::Sunburst,
        ChartKind::Histogram,
        ChartKind::Box,
        ChartKind::Waterfall,
        ChartKind::Funnel,
        ChartKind::Stock,
        ChartKind::Map,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "柱状图",
            ChartKind::HorizontalBar => "条形图",
            ChartKind::Line => "折线图",
            ChartKind::Area => "面积图",
            ChartKind::Pie => "饼图",
            ChartKind::Donut => "圆环图",
            ChartKind::Scatter => "散点图",
            ChartKind::Bubble => "气泡图",
            ChartKind::Polar => "极坐标图",
            ChartKind::Treemap => "树状图",
            ChartKind::Sunburst => "旭日图",
            ChartKind::Histogram => "直方图",
            ChartKind::Box => "箱线图",
            ChartKind::Waterfall => "瀑布图",
            ChartKind::Funnel => "漏斗图",
            ChartKind::Stock => "股价图",
            ChartKind::Map => "地图",
        }
    }

    pub fn from_label(label: &str) -> Option<ChartKind> {
        Self::ALL.into_iter().find(|kind| kind.label() == label.trim())
    }

    pub fn english_name(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::HorizontalBar => "Horizontal Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Area => "Area Chart",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Donut => "Donut Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Bubble => "Bubble Chart",
            ChartKind::Polar => "Polar/Radar Chart",
            ChartKind::Treemap => "Treemap",
            ChartKind::Sunburst => "Sunburst Chart",
            ChartKind::Histogram => "Histogram",
            ChartKind::Box => "Box Plot",
            ChartKind::Waterfall => "Waterfall Chart",
            ChartKind::Funnel => "Funnel Chart",
            ChartKind::Stock => "Candlestick Chart",
            ChartKind::Map => "Map",
        }
    }

    /// Subheader shown above the figures, e.g. "柱状图 (Bar Chart)".
    pub fn subheading(self) -> String {
        let short = match self {
            ChartKind::Polar => "极坐标/雷达图",
            other => other.label(),
        };
        format!("{} ({})", short, self.english_name())
    }

    pub fn description(self) -> &'static str {
        match self {
            ChartKind::Bar => "柱状图用于比较不同类别的数据",
            ChartKind::HorizontalBar => "条形图是横向的柱状图，适合类别名称较长的情况",
            ChartKind::Line => "折线图用于显示数据随时间变化的趋势",
            ChartKind::Area => "面积图是折线图下的区域被填充的图表，用于显示累积趋势",
            ChartKind::Pie => "饼图用于显示各部分占总体的比例",
            ChartKind::Donut => "圆环图是中间有孔的饼图，可以显示更多信息",
            ChartKind::Scatter => "散点图用于显示两个变量之间的关系",
            ChartKind::Bubble => "气泡图是散点图的变体，其中点的大小表示第三个变量的值",
            ChartKind::Polar => "雷达图用于显示多变量数据",
            ChartKind::Treemap => "树状图用于显示分层数据，矩形大小表示数值",
            ChartKind::Sunburst => "旭日图用于显示分层数据，是树状图的圆形变体",
            ChartKind::Histogram => "直方图用于显示数据分布",
            ChartKind::Box => "箱线图用于显示数据分布和离群点",
            ChartKind::Waterfall => "瀑布图用于显示数值的累计变化",
            ChartKind::Funnel => "漏斗图用于显示流程中各个阶段的转化率",
            ChartKind::Stock => "股价图用于显示金融市场价格变动",
            ChartKind::Map => "地图用于显示地理空间数据",
        }
    }

    /// Generated dataset behind the chart. Radar data is inline, so `None`.
    pub fn dataset(self) -> Option<DatasetKey> {
        match self {
            ChartKind::Bar | ChartKind::HorizontalBar => Some(DatasetKey::Bar),
            ChartKind::Line | ChartKind::Area => Some(DatasetKey::Line),
            ChartKind::Pie | ChartKind::Donut => Some(DatasetKey::Pie),
            ChartKind::Scatter | ChartKind::Bubble => Some(DatasetKey::Scatter),
            ChartKind::Polar => None,
            ChartKind::Treemap | ChartKind::Sunburst => Some(DatasetKey::Sunburst),
            ChartKind::Histogram => Some(DatasetKey::Hist),
            ChartKind::Box => Some(DatasetKey::Box),
            ChartKind::Waterfall => Some(DatasetKey::Waterfall),
            ChartKind::Funnel => Some(DatasetKey::Funnel),
            ChartKind::Stock => Some(DatasetKey::Stock),
            ChartKind::Map => Some(DatasetKey::Map),
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn labels_roundtrip() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(ChartKind::from_label(" 地图 "), Some(ChartKind::Map));
        assert_eq!(ChartKind::from_label("Bar"), None);
    }

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<&str> = ChartKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), 17);
    }

    #[test]
    fn every_dataset_is_used() {
        let used: HashSet<DatasetKey> = ChartKind::ALL.iter().filter_map(|k| k.dataset()).collect();
        assert_eq!(used.len(), DatasetKey::ALL.len());
    }

    #[test]
    fn subheading_format() {
        assert_eq!(ChartKind::Bar.subheading(), "柱状图 (Bar Chart)");
        assert_eq!(ChartKind::Polar.subheading(), "极坐标/雷达图 (Polar/Radar Chart)");
    }
}
