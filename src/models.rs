use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRow {
    pub timestamp: NaiveDateTime,
    // None when the cell did not hold an integer score
    pub nps: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Detractor,
    Passive,
    Promoter,
    Unknown,
}

type Rule = (fn(i64) -> bool, Category);

fn is_detractor(nps: i64) -> bool {
    (0..=6).contains(&nps)
}

fn is_promoter(nps: i64) -> bool {
    (9..=10).contains(&nps)
}

fn is_passive(nps: i64) -> bool {
    (7..=8).contains(&nps)
}

// first match wins
const RULES: [Rule; 3] = [
    (is_detractor, Category::Detractor),
    (is_promoter, Category::Promoter),
    (is_passive, Category::Passive),
];

impl Category {
    pub fn classify(nps: Option<i64>) -> Category {
        let Some(score) = nps else {
            return Category::Unknown;
        };

        RULES
            .iter()
            .find(|(matches, _)| matches(score))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Detractor => "detractor",
            Category::Passive => "passive",
            Category::Promoter => "promoter",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    // Weeks start on Monday.
    pub fn bucket_start(&self, timestamp: NaiveDateTime) -> NaiveDate {
        let date = timestamp.date();
        match self {
            Granularity::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
            Granularity::Quarter => {
                let first_month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date)
            }
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Week => "Week",
            Granularity::Month => "Month",
            Granularity::Quarter => "Quarter",
            Granularity::Year => "Year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // The single-letter codes are the period aliases older exports use.
        match value.trim() {
            "week" | "Week" | "W" => Ok(Granularity::Week),
            "month" | "Month" | "M" => Ok(Granularity::Month),
            "quarter" | "Quarter" | "Q" => Ok(Granularity::Quarter),
            "year" | "Year" | "Y" => Ok(Granularity::Year),
            other => Err(ValidationError::InvalidGranularity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub bucket: NaiveDate,
    pub category: Category,
    pub percentage: f64,
    pub total: usize,
    pub count: usize,
}
