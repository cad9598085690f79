use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{AggregateRecord, Category, Granularity, ResponseRow};

// Categories seen anywhere in `rows` are zero-filled into every bucket.
pub fn aggregate(rows: &[ResponseRow], granularity: Granularity) -> Vec<AggregateRecord> {
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<Category, usize>> = BTreeMap::new();
    let mut seen: BTreeSet<Category> = BTreeSet::new();

    for row in rows {
        let category = Category::classify(row.nps);
        let bucket = granularity.bucket_start(row.timestamp);
        *buckets.entry(bucket).or_default().entry(category).or_insert(0) += 1;
        seen.insert(category);
    }

    let mut records = Vec::with_capacity(buckets.len() * seen.len());
    for (bucket, counts) in buckets {
        let total: usize = counts.values().sum();
        if total == 0 {
            continue;
        }

        for category in seen.iter().copied() {
            let count = counts.get(&category).copied().unwrap_or(0);
            records.push(AggregateRecord {
                bucket,
                category,
                percentage: 100.0 * count as f64 / total as f64,
                total,
                count,
            });
        }
    }

    debug!(
        rows = rows.len(),
        records = records.len(),
        granularity = %granularity,
        "aggregated responses"
    );
    records
}
