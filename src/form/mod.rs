//! The prediction request: typed form fields, validation, and encoding.
//!
//! A [`PredictionRequest`] holds the eight user-supplied inputs. Encoding
//! expands it into a named [`FeatureRow`] the way the training pipeline did:
//! calendar fields derived from the date and one indicator column per
//! categorical option, named `<column>_<value>` as pandas `get_dummies`
//! names them. The raw date itself never becomes a model column.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::data::FeatureRow;

pub mod prompt;

/// Training-schema column names.
pub mod columns {
    /// The stray space is present in the training data and must be preserved.
    pub const DAILY_SALES_PERCENTAGE: &str = "Daily_Sales _Percentage";
    pub const MARKET_SHARE: &str = "Market_Share";
    pub const POLITICAL: &str = "Political";
    pub const MARKETING: &str = "Marketing";
    pub const BUDGET: &str = "Budget";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const DAY: &str = "day";
    pub const DAYOFWEEK: &str = "dayofweek";
    pub const MACHINERY: &str = "Infrastructure_Machineries";
    pub const REGION: &str = "Region";
}

/// Form defaults, matching the original data-entry form.
pub mod defaults {
    use super::{Machinery, Region};

    pub const DAILY_SALES_PERCENTAGE: f64 = 0.034463806;
    pub const MARKET_SHARE: u8 = 35;
    pub const POLITICAL: bool = true;
    pub const MARKETING: bool = true;
    pub const BUDGET: f64 = 5000.56;
    pub const MACHINERY: Machinery = Machinery::BackhoeLoader;
    pub const REGION: Region = Region::Sherrichester;
}

/// Earliest accepted request date.
pub fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid calendar date")
}

/// Per-field validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMin {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("date must be on or after {min}, got {date}")]
    DateTooEarly { date: NaiveDate, min: NaiveDate },

    #[error("invalid date {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("cannot parse {field} from {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    #[error("{field} must be 0 or 1, got {value:?}")]
    InvalidFlag {
        field: &'static str,
        value: String,
    },

    #[error("unknown {field} option {value:?} (expected one of: {options})")]
    UnknownOption {
        field: &'static str,
        value: String,
        options: String,
    },
}

// =============================================================================
// Categorical fields
// =============================================================================

/// Infrastructure machinery category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machinery {
    BackhoeLoader,
    ExcavatorsCrawler,
    LoadersWheeled,
    SkidSteerLoaders,
    Compactors,
    TeleHandlers,
}

impl Machinery {
    /// All options, in the order the form lists them.
    pub const ALL: [Machinery; 6] = [
        Machinery::BackhoeLoader,
        Machinery::ExcavatorsCrawler,
        Machinery::LoadersWheeled,
        Machinery::SkidSteerLoaders,
        Machinery::Compactors,
        Machinery::TeleHandlers,
    ];

    /// The label as it appears in the training data.
    pub fn label(&self) -> &'static str {
        match self {
            Machinery::BackhoeLoader => "Backhoe Loader",
            Machinery::ExcavatorsCrawler => "Excavators(crawler)",
            Machinery::LoadersWheeled => "Loaders (Wheeled)",
            Machinery::SkidSteerLoaders => "Skid Steer Loaders",
            Machinery::Compactors => "Compactors",
            Machinery::TeleHandlers => "Tele Handlers",
        }
    }

    fn options() -> String {
        Self::ALL
            .iter()
            .map(|m| m.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Machinery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Machinery {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.label() == s)
            .ok_or_else(|| FieldError::UnknownOption {
                field: "machinery",
                value: s.to_string(),
                options: Self::options(),
            })
    }
}

/// Sales region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Sherrichester,
    OtherRegion,
}

impl Region {
    /// All options, in the order the form lists them.
    pub const ALL: [Region; 2] = [Region::Sherrichester, Region::OtherRegion];

    /// The label as it appears in the training data.
    pub fn label(&self) -> &'static str {
        match self {
            Region::Sherrichester => "Sherrichester",
            Region::OtherRegion => "Other_Region",
        }
    }

    fn options() -> String {
        Self::ALL
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.label() == s)
            .ok_or_else(|| FieldError::UnknownOption {
                field: "region",
                value: s.to_string(),
                options: Self::options(),
            })
    }
}

// =============================================================================
// Field checks
// =============================================================================

/// Validate a request date against the form minimum.
pub fn check_date(date: NaiveDate) -> Result<NaiveDate, FieldError> {
    let min = min_date();
    if date < min {
        return Err(FieldError::DateTooEarly { date, min });
    }
    Ok(date)
}

/// Validate the daily sales percentage, a fraction in `[0, 1]`.
pub fn check_daily_sales_percentage(value: f64) -> Result<f64, FieldError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FieldError::OutOfRange {
            field: "daily sales percentage",
            min: 0.0,
            max: 1.0,
            value,
        });
    }
    Ok(value)
}

/// Validate the market share, an integer percentage in `[0, 100]`.
pub fn check_market_share(value: i64) -> Result<u8, FieldError> {
    if !(0..=100).contains(&value) {
        return Err(FieldError::OutOfRange {
            field: "market share",
            min: 0.0,
            max: 100.0,
            value: value as f64,
        });
    }
    Ok(value as u8)
}

/// Validate the marketing budget, a non-negative amount.
pub fn check_budget(value: f64) -> Result<f64, FieldError> {
    if !(value >= 0.0) {
        return Err(FieldError::BelowMin {
            field: "budget",
            min: 0.0,
            value,
        });
    }
    Ok(value)
}

// =============================================================================
// String parsers (prompt and flag input)
// =============================================================================

/// Parse and validate a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate, FieldError> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        FieldError::InvalidDate {
            value: s.trim().to_string(),
        }
    })?;
    check_date(date)
}

/// Parse and validate a daily sales percentage string.
pub fn parse_daily_sales_percentage(s: &str) -> Result<f64, FieldError> {
    let value = parse_f64("daily sales percentage", s)?;
    check_daily_sales_percentage(value)
}

/// Parse and validate a market share string.
pub fn parse_market_share(s: &str) -> Result<u8, FieldError> {
    let value: i64 = s.trim().parse().map_err(|_| FieldError::InvalidNumber {
        field: "market share",
        value: s.trim().to_string(),
    })?;
    check_market_share(value)
}

/// Parse a 0/1 flag string.
pub fn parse_flag(field: &'static str, s: &str) -> Result<bool, FieldError> {
    match s.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(FieldError::InvalidFlag {
            field,
            value: other.to_string(),
        }),
    }
}

/// Parse and validate a budget string.
pub fn parse_budget(s: &str) -> Result<f64, FieldError> {
    let value = parse_f64("budget", s)?;
    check_budget(value)
}

/// Parse a machinery option by 1-based index or exact label.
pub fn parse_machinery(s: &str) -> Result<Machinery, FieldError> {
    parse_option(s, &Machinery::ALL)
}

/// Parse a region option by 1-based index or exact label.
pub fn parse_region(s: &str) -> Result<Region, FieldError> {
    parse_option(s, &Region::ALL)
}

fn parse_option<T: Copy + FromStr<Err = FieldError>>(
    s: &str,
    all: &[T],
) -> Result<T, FieldError> {
    let trimmed = s.trim();
    if let Ok(idx) = trimmed.parse::<usize>() {
        if (1..=all.len()).contains(&idx) {
            return Ok(all[idx - 1]);
        }
    }
    trimmed.parse()
}

fn parse_f64(field: &'static str, s: &str) -> Result<f64, FieldError> {
    s.trim().parse().map_err(|_| FieldError::InvalidNumber {
        field,
        value: s.trim().to_string(),
    })
}

// =============================================================================
// The prediction request
// =============================================================================

/// One submitted form: the eight user inputs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub date: NaiveDate,
    pub daily_sales_percentage: f64,
    pub market_share: u8,
    pub political: bool,
    pub marketing: bool,
    pub budget: f64,
    pub machinery: Machinery,
    pub region: Region,
}

impl PredictionRequest {
    /// Build a request, validating every field against its declared range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        daily_sales_percentage: f64,
        market_share: i64,
        political: bool,
        marketing: bool,
        budget: f64,
        machinery: Machinery,
        region: Region,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            date: check_date(date)?,
            daily_sales_percentage: check_daily_sales_percentage(daily_sales_percentage)?,
            market_share: check_market_share(market_share)?,
            political,
            marketing,
            budget: check_budget(budget)?,
            machinery,
            region,
        })
    }

    /// Encode the request into a named feature row.
    ///
    /// Produces the scalar columns, the four calendar derivations
    /// (day-of-week counts from Monday = 0, as pandas does), and one
    /// indicator column per categorical option.
    pub fn to_row(&self) -> FeatureRow {
        let mut row = FeatureRow::new();

        row.push(columns::DAILY_SALES_PERCENTAGE, self.daily_sales_percentage as f32);
        row.push(columns::MARKET_SHARE, f32::from(self.market_share));
        row.push(columns::POLITICAL, f32::from(u8::from(self.political)));
        row.push(columns::MARKETING, f32::from(u8::from(self.marketing)));
        row.push(columns::BUDGET, self.budget as f32);

        row.push(columns::YEAR, self.date.year() as f32);
        row.push(columns::MONTH, self.date.month() as f32);
        row.push(columns::DAY, self.date.day() as f32);
        row.push(
            columns::DAYOFWEEK,
            self.date.weekday().num_days_from_monday() as f32,
        );

        for option in Machinery::ALL {
            row.push(
                format!("{}_{}", columns::MACHINERY, option.label()),
                f32::from(u8::from(option == self.machinery)),
            );
        }
        for option in Region::ALL {
            row.push(
                format!("{}_{}", columns::REGION, option.label()),
                f32::from(u8::from(option == self.region)),
            );
        }

        row
    }
}
