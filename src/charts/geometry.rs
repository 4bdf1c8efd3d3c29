//! Chart Geometry Module
//! Numeric helpers behind the figures: binning, kernel density, quartiles,
//! waterfall running totals and hierarchical layouts.

use std::collections::HashMap;
use std::f64::consts::TAU;

/// Calculate percentile using linear interpolation (NumPy compatible).
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within q1 - 1.5 IQR
    pub whisker_low: f64,
    /// Largest value within q3 + 1.5 IQR
    pub whisker_high: f64,
    pub mean: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = sorted(values);
    if sorted.is_empty() {
        return None;
    }

    let q1 = percentile(&sorted, 25.0);
    let median = percentile(&sorted, 50.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let whisker_low = sorted.iter().copied().find(|&v| v >= low_fence).unwrap_or(q1);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= high_fence)
        .unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < low_fence || v > high_fence)
        .collect();
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        mean,
        outliers,
    })
}

/// A histogram bin; `value` is a count or a density depending on the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

impl Bin {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Equal-width histogram over the data range. The last bin is closed.
pub fn histogram(values: &[f64], nbins: usize) -> Vec<Bin> {
    let sorted = sorted(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if nbins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![Bin {
            start: min - 0.5,
            end: max + 0.5,
            value: sorted.len() as f64,
        }];
    }

    let width = (max - min) / nbins as f64;
    let mut counts = vec![0usize; nbins];
    for v in &sorted {
        let idx = (((v - min) / width) as usize).min(nbins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            value: count as f64,
        })
        .collect()
}

/// Histogram with a fixed bin width, bins aligned to multiples of `width`.
pub fn histogram_with_width(values: &[f64], width: f64) -> Vec<Bin> {
    let sorted = sorted(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if width <= 0.0 {
        return Vec::new();
    }

    let first = (min / width).floor() as i64;
    let last = (max / width).floor() as i64;
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for v in &sorted {
        *counts.entry((v / width).floor() as i64).or_default() += 1;
    }

    (first..=last)
        .map(|k| Bin {
            start: k as f64 * width,
            end: (k + 1) as f64 * width,
            value: counts.get(&k).copied().unwrap_or(0) as f64,
        })
        .collect()
}

/// Rescale counts so the histogram integrates to 1.
pub fn to_density(bins: &[Bin]) -> Vec<Bin> {
    let total: f64 = bins.iter().map(|b| b.value).sum();
    if total == 0.0 {
        return bins.to_vec();
    }
    bins.iter()
        .map(|b| Bin {
            value: b.value / (total * b.width()),
            ..*b
        })
        .collect()
}

/// Evenly spaced points, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Scott's rule: sample std * n^(-1/5).
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n < 2.0 {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bw = var.sqrt() * n.powf(-0.2);
    if bw > 0.0 {
        bw
    } else {
        1.0
    }
}

/// Gaussian kernel density of `values` evaluated at each `grid` point.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return vec![0.0; grid.len()];
    }
    let h = scott_bandwidth(values);
    let norm = 1.0 / (values.len() as f64 * h * (TAU).sqrt());

    grid.iter()
        .map(|&x| {
            values
                .iter()
                .map(|&v| {
                    let u = (x - v) / h;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterfallMeasure {
    Relative,
    Total,
}

/// One bar of a waterfall: it spans `base..top`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterfallStep {
    pub base: f64,
    pub top: f64,
    pub measure: WaterfallMeasure,
}

impl WaterfallStep {
    pub fn delta(&self) -> f64 {
        self.top - self.base
    }

    pub fn is_increase(&self) -> bool {
        self.delta() >= 0.0
    }
}

/// Running totals; a `Total` bar ignores its amount and shows the sum so far.
pub fn waterfall_steps(amounts: &[f64], measures: &[WaterfallMeasure]) -> Vec<WaterfallStep> {
    let mut running = 0.0;
    amounts
        .iter()
        .zip(measures)
        .map(|(&amount, &measure)| match measure {
            WaterfallMeasure::Relative => {
                let base = running;
                running += amount;
                WaterfallStep {
                    base,
                    top: running,
                    measure,
                }
            }
            WaterfallMeasure::Total => WaterfallStep {
                base: 0.0,
                top: running,
                measure,
            },
        })
        .collect()
}

/// A node of an aggregated category path.
#[derive(Debug, Clone, PartialEq)]
pub struct HierNode {
    /// Full path joined with '/'
    pub id: String,
    pub label: String,
    pub parent: Option<usize>,
    pub depth: usize,
    pub value: f64,
}

/// Aggregate rows of category paths into a node list. Inner nodes carry the
/// sum of their leaves. Parents always precede their children.
pub fn aggregate_hierarchy(paths: &[Vec<String>], values: &[f64]) -> Vec<HierNode> {
    let mut nodes: Vec<HierNode> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (path, &value) in paths.iter().zip(values) {
        let mut parent = None;
        let mut id = String::new();
        for (depth, label) in path.iter().enumerate() {
            if depth > 0 {
                id.push('/');
            }
            id.push_str(label);

            let idx = *index.entry(id.clone()).or_insert_with(|| {
                nodes.push(HierNode {
                    id: id.clone(),
                    label: label.clone(),
                    parent,
                    depth,
                    value: 0.0,
                });
                nodes.len() - 1
            });
            nodes[idx].value += value;
            parent = Some(idx);
        }
    }

    nodes
}

/// Indices of the children of `parent` (roots when `None`).
pub fn children_of(nodes: &[HierNode], parent: Option<usize>) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.parent == parent)
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn inset(&self, side: f64, top: f64) -> Rect {
        let w = (self.w - 2.0 * side).max(0.0);
        let h = (self.h - side - top).max(0.0);
        Rect::new(self.x + side, self.y + side, w, h)
    }
}

fn worst_ratio(row: &[f64], side: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max = row.iter().copied().fold(f64::MIN, f64::max);
    let min = row.iter().copied().fold(f64::MAX, f64::min);
    let s2 = side * side;
    let sum2 = sum * sum;
    (s2 * max / sum2).max(sum2 / (s2 * min))
}

/// Squarified treemap (Bruls et al.). Returns one rectangle per value in
/// input order; areas are proportional to the values.
pub fn squarify(values: &[f64], rect: Rect) -> Vec<Rect> {
    let mut out = vec![Rect::default(); values.len()];
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || rect.area() <= 0.0 {
        return out;
    }

    let mut order: Vec<usize> = (0..values.len()).filter(|&i| values[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let scale = rect.area() / total;
    let mut free = rect;
    let mut row: Vec<usize> = Vec::new();

    let mut i = 0;
    while i < order.len() {
        let side = free.w.min(free.h);
        let areas = |ids: &[usize]| ids.iter().map(|&j| values[j] * scale).collect::<Vec<f64>>();

        let mut candidate = row.clone();
        candidate.push(order[i]);
        if row.is_empty() || worst_ratio(&areas(&candidate), side) <= worst_ratio(&areas(&row), side) {
            row = candidate;
            i += 1;
        } else {
            free = layout_row(&row, &areas(&row), free, &mut out);
            row.clear();
        }
    }
    if !row.is_empty() {
        let row_areas: Vec<f64> = row.iter().map(|&j| values[j] * scale).collect();
        layout_row(&row, &row_areas, free, &mut out);
    }

    out
}

/// Place one row along the shorter side of `free`; returns the space left.
fn layout_row(ids: &[usize], areas: &[f64], free: Rect, out: &mut [Rect]) -> Rect {
    let sum: f64 = areas.iter().sum();
    if free.w >= free.h {
        // column on the left
        let col_w = if free.h > 0.0 { sum / free.h } else { 0.0 };
        let mut y = free.y;
        for (&id, &a) in ids.iter().zip(areas) {
            let h = if col_w > 0.0 { a / col_w } else { 0.0 };
            out[id] = Rect::new(free.x, y, col_w, h);
            y += h;
        }
        Rect::new(free.x + col_w, free.y, (free.w - col_w).max(0.0), free.h)
    } else {
        // row along the top
        let row_h = if free.w > 0.0 { sum / free.w } else { 0.0 };
        let mut x = free.x;
        for (&id, &a) in ids.iter().zip(areas) {
            let w = if row_h > 0.0 { a / row_h } else { 0.0 };
            out[id] = Rect::new(x, free.y, w, row_h);
            x += w;
        }
        Rect::new(free.x, free.y + row_h, free.w, (free.h - row_h).max(0.0))
    }
}

/// Nested treemap: each node's children are squarified inside the node's
/// rectangle, inset by `padding` with `header` space reserved for the label.
pub fn treemap_layout(nodes: &[HierNode], rect: Rect, padding: f64, header: f64) -> Vec<Rect> {
    let mut out = vec![Rect::default(); nodes.len()];
    fill_treemap(nodes, None, rect, padding, header, &mut out);
    out
}

fn fill_treemap(
    nodes: &[HierNode],
    parent: Option<usize>,
    rect: Rect,
    padding: f64,
    header: f64,
    out: &mut [Rect],
) {
    let children = children_of(nodes, parent);
    if children.is_empty() {
        return;
    }
    let values: Vec<f64> = children.iter().map(|&i| nodes[i].value).collect();
    for (&child, child_rect) in children.iter().zip(squarify(&values, rect)) {
        out[child] = child_rect;
        fill_treemap(
            nodes,
            Some(child),
            child_rect.inset(padding, header),
            padding,
            header,
            out,
        );
    }
}

/// Angular span of a sunburst node, in radians, on ring `depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    pub start: f64,
    pub end: f64,
    pub depth: usize,
}

impl ArcSpan {
    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Roots share the full circle by value; children split their parent's span.
pub fn sunburst_layout(nodes: &[HierNode]) -> Vec<ArcSpan> {
    let mut out = vec![
        ArcSpan {
            start: 0.0,
            end: 0.0,
            depth: 0,
        };
        nodes.len()
    ];
    fill_sunburst(nodes, None, 0.0, TAU, &mut out);
    out
}

fn fill_sunburst(nodes: &[HierNode], parent: Option<usize>, start: f64, end: f64, out: &mut [ArcSpan]) {
    let children = children_of(nodes, parent);
    let total: f64 = children.iter().map(|&i| nodes[i].value.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }
    let mut cursor = start;
    for child in children {
        let span = (end - start) * nodes[child].value.max(0.0) / total;
        out[child] = ArcSpan {
            start: cursor,
            end: cursor + span,
            depth: nodes[child].depth,
        };
        fill_sunburst(nodes, Some(child), cursor, cursor + span, out);
        cursor += span;
    }
}

/// Outline of an annular sector; `inner == 0` gives a pie slice.
pub fn sector_polygon(inner: f64, outer: f64, start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start).abs() / TAU) * 96.0).ceil().max(2.0) as usize;
    let angles = linspace(start, end, steps + 1);

    let mut points: Vec<[f64; 2]> = angles
        .iter()
        .map(|&a| [outer * a.cos(), outer * a.sin()])
        .collect();
    if inner > 0.0 {
        points.extend(angles.iter().rev().map(|&a| [inner * a.cos(), inner * a.sin()]));
    } else {
        points.push([0.0, 0.0]);
    }
    points
}

/// Plotly-style bubble sizing: marker diameter scales with the square root
/// of the value, the largest value getting `size_max` pixels.
pub fn bubble_diameters(values: &[f64], size_max: f64) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| size_max * (v.max(0.0) / max).sqrt())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(percentile(&v, 50.0), 2.5));
        assert!(approx(percentile(&v, 0.0), 1.0));
        assert!(approx(percentile(&v, 100.0), 4.0));
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn box_stats_flag_outliers() {
        let mut values: Vec<f64> = (1..=9).map(|v| v as f64).collect();
        values.push(100.0);
        let stats = box_stats(&values).unwrap();
        assert!(approx(stats.median, 5.5));
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(approx(stats.whisker_high, 9.0));
        assert!(approx(stats.whisker_low, 1.0));
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn histogram_counts_everything() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.37).sin()).collect();
        let bins = histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        let total: f64 = bins.iter().map(|b| b.value).sum();
        assert!(approx(total, 1000.0));
        // max lands in the closed last bin
        assert!(bins.last().unwrap().value > 0.0);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(histogram(&[], 10).is_empty());
        let single = histogram(&[2.0, 2.0, 2.0], 10);
        assert_eq!(single.len(), 1);
        assert!(approx(single[0].value, 3.0));
    }

    #[test]
    fn fixed_width_bins_are_aligned() {
        let bins = histogram_with_width(&[0.05, 0.15, 0.19, 0.41], 0.2);
        assert_eq!(bins.len(), 3);
        assert!(approx(bins[0].start, 0.0));
        assert!(approx(bins[0].value, 3.0));
        assert!(approx(bins[1].value, 0.0));
        assert!(approx(bins[2].value, 1.0));
    }

    #[test]
    fn density_integrates_to_one() {
        let values: Vec<f64> = (0..500).map(|i| (i as f64).sqrt()).collect();
        let density = to_density(&histogram_with_width(&values, 0.5));
        let area: f64 = density.iter().map(|b| b.value * b.width()).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 7919) % 200) as f64 / 50.0 - 2.0).collect();
        let grid = linspace(-8.0, 8.0, 1601);
        let density = gaussian_kde(&values, &grid);
        let step = grid[1] - grid[0];
        let area: f64 = density.iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 1e-3, "area = {}", area);
    }

    #[test]
    fn linspace_endpoints() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn waterfall_total_is_running_sum() {
        use WaterfallMeasure::*;
        let steps = waterfall_steps(
            &[1000.0, -400.0, -300.0, -100.0, 50.0, 250.0],
            &[Relative, Relative, Relative, Relative, Relative, Total],
        );
        assert_eq!(steps.len(), 6);
        assert!(approx(steps[1].base, 1000.0));
        assert!(approx(steps[1].top, 600.0));
        assert!(!steps[1].is_increase());
        assert!(approx(steps[4].base, 200.0));
        assert!(approx(steps[4].top, 250.0));
        assert!(approx(steps[5].base, 0.0));
        assert!(approx(steps[5].top, 250.0));
    }

    fn sales_nodes() -> Vec<HierNode> {
        let rows = [
            ("中国", "电子产品", "手机", 120.0),
            ("中国", "服装", "男装", 80.0),
            ("中国", "食品", "水果", 60.0),
            ("美国", "电子产品", "电脑", 150.0),
            ("日本", "食品", "海鲜", 50.0),
        ];
        let paths: Vec<Vec<String>> = rows
            .iter()
            .map(|(a, b, c, _)| vec![a.to_string(), b.to_string(), c.to_string()])
            .collect();
        let values: Vec<f64> = rows.iter().map(|r| r.3).collect();
        aggregate_hierarchy(&paths, &values)
    }

    #[test]
    fn hierarchy_sums_leaves() {
        let nodes = sales_nodes();
        let roots = children_of(&nodes, None);
        assert_eq!(roots.len(), 3);
        let china = &nodes[roots[0]];
        assert_eq!(china.label, "中国");
        assert!(approx(china.value, 260.0));
        let root_total: f64 = roots.iter().map(|&i| nodes[i].value).sum();
        assert!(approx(root_total, 460.0));
        for (i, node) in nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                assert!(p < i);
                assert_eq!(nodes[p].depth + 1, node.depth);
            }
        }
        assert!(nodes.iter().any(|n| n.id == "中国/电子产品/手机"));
    }

    #[test]
    fn squarify_areas_are_proportional() {
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let rect = Rect::new(0.0, 0.0, 6.0, 4.0);
        let rects = squarify(&values, rect);
        let total: f64 = values.iter().sum();
        for (v, r) in values.iter().zip(&rects) {
            assert!((r.area() - v / total * rect.area()).abs() < 1e-9);
            assert!(r.x >= -1e-9 && r.y >= -1e-9);
            assert!(r.x + r.w <= 6.0 + 1e-9 && r.y + r.h <= 4.0 + 1e-9);
        }
    }

    #[test]
    fn treemap_children_inside_parent() {
        let nodes = sales_nodes();
        let rects = treemap_layout(&nodes, Rect::new(0.0, 0.0, 100.0, 60.0), 1.0, 4.0);
        for (i, node) in nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                let (c, pr) = (rects[i], rects[p]);
                assert!(c.x >= pr.x - 1e-9 && c.y >= pr.y - 1e-9);
                assert!(c.x + c.w <= pr.x + pr.w + 1e-9);
                assert!(c.y + c.h <= pr.y + pr.h + 1e-9);
            }
        }
    }

    #[test]
    fn sunburst_children_partition_parent() {
        let nodes = sales_nodes();
        let arcs = sunburst_layout(&nodes);
        let roots = children_of(&nodes, None);
        let covered: f64 = roots.iter().map(|&i| arcs[i].end - arcs[i].start).sum();
        assert!(approx(covered, TAU));
        for (i, _) in nodes.iter().enumerate() {
            let kids = children_of(&nodes, Some(i));
            if kids.is_empty() {
                continue;
            }
            let span: f64 = kids.iter().map(|&k| arcs[k].end - arcs[k].start).sum();
            assert!(approx(span, arcs[i].end - arcs[i].start));
            assert!(approx(arcs[kids[0]].start, arcs[i].start));
        }
    }

    #[test]
    fn sector_shapes() {
        let slice = sector_polygon(0.0, 1.0, 0.0, TAU / 4.0);
        assert_eq!(*slice.last().unwrap(), [0.0, 0.0]);
        let ring = sector_polygon(0.4, 1.0, 0.0, TAU / 4.0);
        let first = ring.first().unwrap();
        assert!(approx(first[0], 1.0));
        let last = ring.last().unwrap();
        assert!(approx(last[0], 0.4));
    }

    #[test]
    fn bubbles_scale_by_sqrt() {
        let d = bubble_diameters(&[100.0, 25.0, 0.0], 60.0);
        assert!(approx(d[0], 60.0));
        assert!(approx(d[1], 30.0));
        assert!(approx(d[2], 0.0));
    }
}
