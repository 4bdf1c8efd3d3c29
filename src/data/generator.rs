//! Sample Data Generator Module
//! Builds the deterministic synthetic tables every chart page draws from.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

/// 2023-01-01 as days since the Unix epoch.
pub const START_DAY: i32 = 19_358;

const CATEGORIES: [&str; 5] = ["A", "B", "C", "D", "E"];
const SCATTER_KINDS: [&str; 3] = ["类型1", "类型2", "类型3"];
const LINE_DAYS: usize = 30;
const STOCK_DAYS: usize = 20;
pub const HIST_SAMPLES: usize = 1000;
const BOX_SAMPLES_PER_CATEGORY: usize = 100;
const SCATTER_POINTS: usize = 50;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Failed to build table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Invalid distribution parameters: {0}")]
    Distribution(String),
}

/// Names of the generated datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKey {
    Bar,
    Line,
    Pie,
    Scatter,
    Sunburst,
    Hist,
    Box,
    Waterfall,
    Funnel,
    Stock,
    Map,
}

impl DatasetKey {
    pub const ALL: [DatasetKey; 11] = [
        DatasetKey::Bar,
        DatasetKey::Line,
        DatasetKey::Pie,
        DatasetKey::Scatter,
        DatasetKey::Sunburst,
        DatasetKey::Hist,
        DatasetKey::Box,
        DatasetKey::Waterfall,
        DatasetKey::Funnel,
        DatasetKey::Stock,
        DatasetKey::Map,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DatasetKey::Bar => "bar",
            DatasetKey::Line => "line",
            DatasetKey::Pie => "pie",
            DatasetKey::Scatter => "scatter",
            DatasetKey::Sunburst => "sunburst",
            DatasetKey::Hist => "hist",
            DatasetKey::Box => "box",
            DatasetKey::Waterfall => "waterfall",
            DatasetKey::Funnel => "funnel",
            DatasetKey::Stock => "stock",
            DatasetKey::Map => "map",
        }
    }
}

/// The full set of generated tables for one seed.
#[derive(Debug, Clone)]
pub struct SampleData {
    seed: u64,
    tables: HashMap<DatasetKey, DataFrame>,
}

static CACHE: OnceLock<Mutex<HashMap<u64, Arc<SampleData>>>> = OnceLock::new();

impl SampleData {
    /// Generate once per seed and share the result for the rest of the process.
    pub fn cached(seed: u64) -> Result<Arc<SampleData>, GeneratorError> {
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        // inserts are single calls, so a poisoned map is still consistent
        let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(data) = guard.get(&seed) {
            tracing::trace!(seed, "sample data cache hit");
            return Ok(Arc::clone(data));
        }

        let data = Arc::new(SampleDataGenerator::new(seed).generate()?);
        guard.insert(seed, Arc::clone(&data));
        Ok(data)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get a table by key.
    pub fn get(&self, key: DatasetKey) -> Option<&DataFrame> {
        self.tables.get(&key)
    }

    /// Extra standard-normal series for the multi-series distribution plot.
    ///
    /// Drawn from a second stream seeded with `seed + 1`, so the page is
    /// reproducible without disturbing the main tables.
    pub fn distribution_samples(
        &self,
        count: usize,
        len: usize,
    ) -> Result<Vec<Vec<f64>>, GeneratorError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let normal = standard_normal()?;
        Ok((0..count)
            .map(|_| (0..len).map(|_| rng.sample(&normal)).collect())
            .collect())
    }
}

fn standard_normal() -> Result<Normal, GeneratorError> {
    Normal::new(0.0, 1.0).map_err(|e| GeneratorError::Distribution(e.to_string()))
}

/// Deterministic generator for the demo tables.
pub struct SampleDataGenerator {
    seed: u64,
}

impl SampleDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generate all tables. Draw order is fixed, so a seed determines every value.
    pub fn generate(&self) -> Result<SampleData, GeneratorError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let normal = standard_normal()?;
        let randn = |rng: &mut StdRng, n: usize| -> Vec<f64> {
            (0..n).map(|_| rng.sample(&normal)).collect()
        };

        let mut tables = HashMap::new();

        // Bars: 5 categories x 2 groups
        let bar_values: Vec<f64> = randn(&mut rng, 10).iter().map(|v| v * 100.0 + 50.0).collect();
        let bar_categories: Vec<&str> = CATEGORIES.iter().chain(CATEGORIES.iter()).copied().collect();
        let bar_groups: Vec<&str> = std::iter::repeat("组1")
            .take(5)
            .chain(std::iter::repeat("组2").take(5))
            .collect();
        tables.insert(
            DatasetKey::Bar,
            DataFrame::new(vec![
                Column::new("category".into(), bar_categories),
                Column::new("value".into(), bar_values),
                Column::new("group".into(), bar_groups),
            ])?,
        );

        // Lines: three random walks
        let series1 = offset(cumsum(&randn(&mut rng, LINE_DAYS)), 50.0);
        let series2 = offset(cumsum(&randn(&mut rng, LINE_DAYS)), 30.0);
        let series3 = offset(cumsum(&randn(&mut rng, LINE_DAYS)), 70.0);
        tables.insert(
            DatasetKey::Line,
            DataFrame::new(vec![
                date_column(LINE_DAYS)?,
                Column::new("series1".into(), series1),
                Column::new("series2".into(), series2),
                Column::new("series3".into(), series3),
            ])?,
        );

        // Pie shares
        let shares: Vec<f64> = (0..CATEGORIES.len()).map(|_| rng.gen::<f64>() * 100.0).collect();
        tables.insert(
            DatasetKey::Pie,
            DataFrame::new(vec![
                Column::new("item".into(), CATEGORIES.to_vec()),
                Column::new("share".into(), shares),
            ])?,
        );

        // Scatter / bubble points
        let xs: Vec<f64> = randn(&mut rng, SCATTER_POINTS).iter().map(|v| v * 10.0).collect();
        let ys: Vec<f64> = randn(&mut rng, SCATTER_POINTS).iter().map(|v| v * 10.0).collect();
        let sizes: Vec<f64> = (0..SCATTER_POINTS).map(|_| rng.gen::<f64>() * 100.0).collect();
        let kinds: Vec<&str> = (0..SCATTER_POINTS)
            .map(|_| SCATTER_KINDS[rng.gen_range(0..SCATTER_KINDS.len())])
            .collect();
        let amounts: Vec<f64> = (0..SCATTER_POINTS).map(|_| rng.gen::<f64>() * 100.0).collect();
        tables.insert(
            DatasetKey::Scatter,
            DataFrame::new(vec![
                Column::new("x".into(), xs),
                Column::new("y".into(), ys),
                Column::new("size".into(), sizes),
                Column::new("kind".into(), kinds),
                Column::new("amount".into(), amounts),
            ])?,
        );

        // Hierarchical sales (fixed)
        tables.insert(
            DatasetKey::Sunburst,
            DataFrame::new(vec![
                Column::new(
                    "country".into(),
                    ["中国", "中国", "中国", "美国", "美国", "美国", "日本", "日本"],
                ),
                Column::new(
                    "category".into(),
                    ["电子产品", "服装", "食品", "电子产品", "服装", "食品", "电子产品", "食品"],
                ),
                Column::new(
                    "subcategory".into(),
                    ["手机", "男装", "水果", "电脑", "女装", "肉类", "相机", "海鲜"],
                ),
                Column::new(
                    "sales".into(),
                    [120.0, 80.0, 60.0, 150.0, 90.0, 70.0, 100.0, 50.0],
                ),
            ])?,
        );

        // Histogram samples
        tables.insert(
            DatasetKey::Hist,
            DataFrame::new(vec![Column::new("value".into(), randn(&mut rng, HIST_SAMPLES))])?,
        );

        // Box values: three shifted normals
        let mut box_categories = Vec::with_capacity(3 * BOX_SAMPLES_PER_CATEGORY);
        let mut box_values = Vec::with_capacity(3 * BOX_SAMPLES_PER_CATEGORY);
        for (category, shift) in [("A", 1.0), ("B", 2.0), ("C", 3.0)] {
            box_categories.extend(std::iter::repeat(category).take(BOX_SAMPLES_PER_CATEGORY));
            box_values.extend(
                randn(&mut rng, BOX_SAMPLES_PER_CATEGORY)
                    .into_iter()
                    .map(|v| v + shift),
            );
        }
        tables.insert(
            DatasetKey::Box,
            DataFrame::new(vec![
                Column::new("category".into(), box_categories),
                Column::new("value".into(), box_values),
            ])?,
        );

        // Waterfall ledger (fixed)
        tables.insert(
            DatasetKey::Waterfall,
            DataFrame::new(vec![
                Column::new(
                    "item".into(),
                    ["收入", "成本", "运营费用", "税费", "其他", "净利润"],
                ),
                Column::new(
                    "amount".into(),
                    [1000.0, -400.0, -300.0, -100.0, 50.0, 250.0],
                ),
            ])?,
        );

        // Funnel (fixed)
        tables.insert(
            DatasetKey::Funnel,
            DataFrame::new(vec![
                Column::new("stage".into(), ["访问", "注册", "试用", "购买", "复购"]),
                Column::new("users".into(), [1000.0, 800.0, 600.0, 400.0, 200.0]),
            ])?,
        );

        // OHLC prices
        let open = offset(cumsum(&randn(&mut rng, STOCK_DAYS)), 100.0);
        let high = offset(cumsum(&randn(&mut rng, STOCK_DAYS)), 105.0);
        let low = offset(cumsum(&randn(&mut rng, STOCK_DAYS)), 95.0);
        let close = offset(cumsum(&randn(&mut rng, STOCK_DAYS)), 100.0);
        let volume: Vec<i64> = (0..STOCK_DAYS).map(|_| rng.gen_range(1000..10000)).collect();
        tables.insert(
            DatasetKey::Stock,
            DataFrame::new(vec![
                date_column(STOCK_DAYS)?,
                Column::new("open".into(), open),
                Column::new("high".into(), high),
                Column::new("low".into(), low),
                Column::new("close".into(), close),
                Column::new("volume".into(), volume),
            ])?,
        );

        // City values (fixed)
        tables.insert(
            DatasetKey::Map,
            DataFrame::new(vec![
                Column::new(
                    "city".into(),
                    ["北京", "上海", "广州", "深圳", "杭州", "成都", "武汉", "西安"],
                ),
                Column::new(
                    "lon".into(),
                    [116.40, 121.47, 113.26, 114.06, 120.15, 104.07, 114.31, 108.94],
                ),
                Column::new(
                    "lat".into(),
                    [39.90, 31.23, 23.12, 22.54, 30.28, 30.67, 30.52, 34.27],
                ),
                Column::new(
                    "amount".into(),
                    [800.0, 1000.0, 600.0, 700.0, 500.0, 400.0, 300.0, 350.0],
                ),
            ])?,
        );

        for (key, df) in &tables {
            tracing::debug!(dataset = key.name(), rows = df.height(), cols = df.width(), "generated");
        }
        tracing::info!(seed = self.seed, datasets = tables.len(), "sample data ready");

        Ok(SampleData {
            seed: self.seed,
            tables,
        })
    }
}

fn cumsum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

fn offset(values: Vec<f64>, by: f64) -> Vec<f64> {
    values.into_iter().map(|v| v + by).collect()
}

/// Daily `date` column starting at 2023-01-01.
fn date_column(days: usize) -> PolarsResult<Column> {
    let physical: Vec<i32> = (0..days as i32).map(|d| START_DAY + d).collect();
    Column::new("date".into(), physical).cast(&DataType::Date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64) -> SampleData {
        SampleDataGenerator::new(seed).generate().unwrap()
    }

    #[test]
    fn all_datasets_present() {
        let data = generate(42);
        for key in DatasetKey::ALL {
            let df = data.get(key).unwrap_or_else(|| panic!("missing {}", key.name()));
            assert!(df.height() > 0, "{} is empty", key.name());
        }
    }

    #[test]
    fn same_seed_same_tables() {
        let a = generate(42);
        let b = generate(42);
        for key in DatasetKey::ALL {
            assert!(
                a.get(key).unwrap().equals(b.get(key).unwrap()),
                "{} differs between runs",
                key.name()
            );
        }
    }

    #[test]
    fn different_seed_different_random_tables() {
        let a = generate(42);
        let b = generate(43);
        assert!(!a.get(DatasetKey::Hist).unwrap().equals(b.get(DatasetKey::Hist).unwrap()));
        // fixed tables do not depend on the seed
        assert!(a
            .get(DatasetKey::Funnel)
            .unwrap()
            .equals(b.get(DatasetKey::Funnel).unwrap()));
    }

    #[test]
    fn columns_share_row_count() {
        let data = generate(42);
        for key in DatasetKey::ALL {
            let df = data.get(key).unwrap();
            for column in df.get_columns() {
                assert_eq!(column.len(), df.height(), "{}.{}", key.name(), column.name());
            }
        }
    }

    #[test]
    fn row_counts() {
        let data = generate(42);
        let expected = [
            (DatasetKey::Bar, 10),
            (DatasetKey::Line, 30),
            (DatasetKey::Pie, 5),
            (DatasetKey::Scatter, 50),
            (DatasetKey::Sunburst, 8),
            (DatasetKey::Hist, 1000),
            (DatasetKey::Box, 300),
            (DatasetKey::Waterfall, 6),
            (DatasetKey::Funnel, 5),
            (DatasetKey::Stock, 20),
            (DatasetKey::Map, 8),
        ];
        for (key, rows) in expected {
            assert_eq!(data.get(key).unwrap().height(), rows, "{}", key.name());
        }
    }

    #[test]
    fn bar_table_shape() {
        let data = generate(42);
        let df = data.get(DatasetKey::Bar).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["category", "value", "group"]);
        let groups: Vec<&str> = df.column("group").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(groups.iter().filter(|g| **g == "组1").count(), 5);
        assert_eq!(groups.iter().filter(|g| **g == "组2").count(), 5);
    }

    #[test]
    fn dates_start_on_new_year() {
        let data = generate(42);
        let df = data.get(DatasetKey::Stock).unwrap();
        let date = df.column("date").unwrap();
        assert_eq!(date.dtype(), &DataType::Date);
        let first = date.get(0).unwrap().to_string();
        assert_eq!(first, "2023-01-01");
    }

    #[test]
    fn scatter_kinds_come_from_fixed_set() {
        let data = generate(42);
        let kinds = data.get(DatasetKey::Scatter).unwrap().column("kind").unwrap().clone();
        for kind in kinds.str().unwrap().into_no_null_iter() {
            assert!(SCATTER_KINDS.contains(&kind));
        }
    }

    #[test]
    fn volume_in_range() {
        let data = generate(42);
        let volume = data.get(DatasetKey::Stock).unwrap().column("volume").unwrap().clone();
        for v in volume.i64().unwrap().into_no_null_iter() {
            assert!((1000..10000).contains(&v));
        }
    }

    #[test]
    fn cache_returns_same_instance() {
        let a = SampleData::cached(4242).unwrap();
        let b = SampleData::cached(4242).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = SampleData::cached(4243).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn distribution_samples_are_reproducible() {
        let data = generate(42);
        let a = data.distribution_samples(3, 1000).unwrap();
        let b = data.distribution_samples(3, 1000).unwrap();
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(|s| s.len() == 1000));
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn cumsum_accumulates() {
        assert_eq!(cumsum(&[1.0, 2.0, -0.5]), vec![1.0, 3.0, 2.5]);
    }
}
