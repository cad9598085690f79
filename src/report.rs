use std::fmt::Write;

use chrono::NaiveDate;

use crate::chart::{ChartSpec, Segment};
use crate::models::{Category, Granularity};

const BAR_WIDTH: usize = 40;

fn glyph(category: Category) -> char {
    match category {
        Category::Detractor => '#',
        Category::Passive => '=',
        Category::Promoter => '+',
        Category::Unknown => '?',
    }
}

fn segments_for(chart: &ChartSpec, bucket: NaiveDate) -> Vec<(Category, &Segment)> {
    chart
        .series
        .iter()
        .filter_map(|series| {
            series
                .segments
                .iter()
                .find(|segment| segment.bucket == bucket)
                .map(|segment| (series.category, segment))
        })
        .collect()
}

// Edges round on the running total so widths always add up to BAR_WIDTH.
fn draw_bar(segments: &[(Category, &Segment)]) -> String {
    let mut bar = String::with_capacity(BAR_WIDTH);
    let mut cumulative = 0.0;
    let mut drawn = 0usize;

    for (category, segment) in segments {
        cumulative += segment.percentage;
        let edge = ((cumulative / 100.0) * BAR_WIDTH as f64).round() as usize;
        let edge = edge.min(BAR_WIDTH);
        for _ in drawn..edge {
            bar.push(glyph(*category));
        }
        drawn = drawn.max(edge);
    }

    for _ in drawn..BAR_WIDTH {
        bar.push(' ');
    }
    bar
}

pub fn build_report(chart: &ChartSpec, source: &str, granularity: Granularity) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {}", chart.title);
    let _ = writeln!(output, "Source: {} (grouped by {})", source, granularity);
    let _ = writeln!(output);

    let totals = chart.totals();
    for bucket in chart.x_axis.category_order.iter() {
        let segments = segments_for(chart, *bucket);
        let total = totals.get(bucket).copied().unwrap_or(0);
        let labels: Vec<String> = segments
            .iter()
            .map(|(category, segment)| format!("{} {}", category, segment.label))
            .collect();

        let _ = writeln!(
            output,
            "{} |{}| total {:>4}  {}",
            bucket,
            draw_bar(&segments),
            total,
            labels.join(", ")
        );
    }

    let legend: Vec<String> = chart
        .series
        .iter()
        .map(|series| format!("{} {}", glyph(series.category), series.category))
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "Legend: {}", legend.join("  "));

    output
}
