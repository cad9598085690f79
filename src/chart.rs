use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, ValidationError};
use crate::models::{AggregateRecord, Category};

pub const CHART_TITLE: &str = "NPS Score Distribution Over Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Stack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    pub field: &'static str,
    pub title: &'static str,
    pub temporal: bool,
    // total descending, then earlier bucket
    pub category_order: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub field: &'static str,
    pub title: &'static str,
    pub range: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub bucket: NaiveDate,
    pub percentage: f64,
    pub label: String,
    pub hover_total: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub category: Category,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub bar_mode: BarMode,
    pub x_axis: XAxis,
    pub y_axis: YAxis,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn totals(&self) -> BTreeMap<NaiveDate, usize> {
        self.series
            .iter()
            .flat_map(|series| series.segments.iter())
            .map(|segment| (segment.bucket, segment.hover_total))
            .collect()
    }
}

pub fn format_label(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

pub fn render(records: &[AggregateRecord]) -> Result<ChartSpec> {
    if records.is_empty() {
        return Err(ValidationError::NothingToRender.into());
    }

    let mut by_category: BTreeMap<Category, Vec<Segment>> = BTreeMap::new();
    let mut totals: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for record in records {
        totals.insert(record.bucket, record.total);
        by_category
            .entry(record.category)
            .or_default()
            .push(Segment {
                bucket: record.bucket,
                percentage: record.percentage,
                label: format_label(record.percentage),
                hover_total: record.total,
                count: record.count,
            });
    }

    let mut category_order: Vec<(NaiveDate, usize)> = totals.into_iter().collect();
    category_order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    Ok(ChartSpec {
        title: CHART_TITLE,
        bar_mode: BarMode::Stack,
        x_axis: XAxis {
            field: "bucket",
            title: "Date",
            temporal: true,
            category_order: category_order.into_iter().map(|(bucket, _)| bucket).collect(),
        },
        y_axis: YAxis {
            field: "percentage",
            title: "Percentage",
            range: [0.0, 100.0],
        },
        series: by_category
            .into_iter()
            .map(|(category, segments)| Series { category, segments })
            .collect(),
    })
}

pub fn chart_to_json(chart: &ChartSpec) -> Result<String> {
    Ok(serde_json::to_string_pretty(chart)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NpsError;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(bucket: NaiveDate, category: Category, count: usize, total: usize) -> AggregateRecord {
        AggregateRecord {
            bucket,
            category,
            percentage: 100.0 * count as f64 / total as f64,
            total,
            count,
        }
    }

    fn sample_records() -> Vec<AggregateRecord> {
        vec![
            record(ymd(2024, 1, 1), Category::Detractor, 1, 3),
            record(ymd(2024, 1, 1), Category::Promoter, 2, 3),
            record(ymd(2024, 2, 1), Category::Detractor, 4, 5),
            record(ymd(2024, 2, 1), Category::Promoter, 1, 5),
            record(ymd(2024, 3, 1), Category::Detractor, 0, 3),
            record(ymd(2024, 3, 1), Category::Promoter, 3, 3),
        ]
    }

    #[test]
    fn empty_records_cannot_be_rendered() {
        let err = render(&[]).unwrap_err();
        assert!(matches!(
            err,
            NpsError::Validation(ValidationError::NothingToRender)
        ));
    }

    #[test]
    fn labels_use_two_decimals_and_percent_sign() {
        assert_eq!(format_label(100.0 / 3.0), "33.33%");
        assert_eq!(format_label(0.0), "0.00%");
        assert_eq!(format_label(100.0), "100.00%");
        assert_eq!(format_label(66.666_666), "66.67%");
    }

    #[test]
    fn one_series_per_category_with_buckets_ascending() {
        let chart = render(&sample_records()).unwrap();

        assert_eq!(chart.title, CHART_TITLE);
        assert_eq!(chart.bar_mode, BarMode::Stack);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].category, Category::Detractor);
        assert_eq!(chart.series[1].category, Category::Promoter);

        let buckets: Vec<NaiveDate> = chart.series[1]
            .segments
            .iter()
            .map(|segment| segment.bucket)
            .collect();
        assert_eq!(buckets, vec![ymd(2024, 1, 1), ymd(2024, 2, 1), ymd(2024, 3, 1)]);
        assert_eq!(chart.series[1].segments[0].label, "66.67%");
        assert_eq!(chart.series[1].segments[1].hover_total, 5);
    }

    #[test]
    fn bars_order_by_total_descending_then_bucket() {
        let chart = render(&sample_records()).unwrap();
        assert_eq!(
            chart.x_axis.category_order,
            vec![ymd(2024, 2, 1), ymd(2024, 1, 1), ymd(2024, 3, 1)]
        );
        assert_eq!(chart.totals().get(&ymd(2024, 3, 1)), Some(&3));
    }

    #[test]
    fn json_uses_lowercase_names_and_iso_dates() {
        let chart = render(&sample_records()).unwrap();
        let json = chart_to_json(&chart).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["bar_mode"], "stack");
        assert_eq!(value["series"][0]["category"], "detractor");
        assert_eq!(value["x_axis"]["category_order"][0], "2024-02-01");
        assert_eq!(value["y_axis"]["range"][1], 100.0);
        assert_eq!(value["series"][0]["segments"][1]["label"], "80.00%");
    }
}
