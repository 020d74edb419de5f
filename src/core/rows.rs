//! Row-level parsing: every raw input row becomes a typed record or a skip reason
//!
//! Rows are never rejected by panicking or by aborting the run. A row that
//! cannot be used is carried forward as a [`SkippedRow`] so the auditor can
//! report it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{AuditFinding, DeliveryRecord, Item, RuleId, StockReading};

/// Which input dataset a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowSource {
    Catalog,
    Stock,
    Delivery,
}

impl std::fmt::Display for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowSource::Catalog => write!(f, "item catalog"),
            RowSource::Stock => write!(f, "stock levels"),
            RowSource::Delivery => write!(f, "deliveries"),
        }
    }
}

/// Why a row was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable date `{0}`")]
    BadDate(String),

    #[error("field `{field}` is not a valid number: `{value}`")]
    BadNumber { field: &'static str, value: String },

    #[error("negative stock count {0}")]
    NegativeStock(f64),

    #[error("delivery amount {0} is not positive")]
    NonPositiveDelivery(f64),

    #[error("invalid catalog entry: {0}")]
    InvalidItem(String),

    #[error("duplicate catalog entry; the first entry is kept")]
    DuplicateItem,

    #[error("row could not be read: {0}")]
    Unreadable(String),
}

/// A row that was left out of the pipeline, with whatever context survived parsing
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub source: RowSource,
    /// 1-based line in the source file, when known
    pub line: Option<usize>,
    pub item_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub reason: SkipReason,
}

impl SkippedRow {
    pub fn to_finding(&self) -> AuditFinding {
        let rule = match self.reason {
            SkipReason::NegativeStock(_) => RuleId::NegativeStock,
            _ => RuleId::MalformedRow,
        };
        let location = match self.line {
            Some(line) => format!("{} row {}", self.source, line),
            None => format!("{} record", self.source),
        };
        AuditFinding::new(
            rule,
            self.item_name.as_deref(),
            self.date,
            format!("{} skipped: {}", location, self.reason),
        )
    }
}

/// Per-row outcome
pub type RowResult<T> = Result<T, SkippedRow>;

// =========================================================================
// Raw rows as read from tabular files
// =========================================================================

/// Stock level row with every field kept as text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStockRow {
    #[serde(rename = "Date", alias = "date", default)]
    pub date: Option<String>,
    #[serde(rename = "Item_Name", alias = "item_name", default)]
    pub item_name: Option<String>,
    #[serde(rename = "Current_Stock", alias = "current_stock", default)]
    pub current_stock: Option<String>,
}

/// Delivery row with every field kept as text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeliveryRow {
    #[serde(rename = "Date", alias = "date", default)]
    pub date: Option<String>,
    #[serde(rename = "Item_Name", alias = "item_name", default)]
    pub item_name: Option<String>,
    #[serde(rename = "Delivery_Amount", alias = "delivery_amount", default)]
    pub delivery_amount: Option<String>,
    #[serde(rename = "Notes", alias = "notes", default)]
    pub notes: Option<String>,
}

/// Catalog row with every field kept as text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItemRow {
    #[serde(rename = "Item_Name", alias = "item_name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Unit", alias = "unit", default)]
    pub unit: Option<String>,
    #[serde(rename = "Min_Threshold", alias = "min_threshold", default)]
    pub min_threshold: Option<String>,
    #[serde(rename = "Max_Capacity", alias = "max_capacity", default)]
    pub max_capacity: Option<String>,
    #[serde(rename = "Lead_Time_Days", alias = "lead_time_days", default)]
    pub lead_time_days: Option<String>,
    #[serde(rename = "Cost_Per_Unit", alias = "cost_per_unit", default)]
    pub cost_per_unit: Option<String>,
    #[serde(rename = "Supplier", alias = "supplier", default)]
    pub supplier: Option<String>,
}

impl From<&StockReading> for RawStockRow {
    fn from(reading: &StockReading) -> Self {
        Self {
            date: Some(reading.date.to_string()),
            item_name: Some(reading.item_name.clone()),
            current_stock: Some(reading.current_stock.to_string()),
        }
    }
}

impl From<&DeliveryRecord> for RawDeliveryRow {
    fn from(delivery: &DeliveryRecord) -> Self {
        Self {
            date: Some(delivery.date.to_string()),
            item_name: Some(delivery.item_name.clone()),
            delivery_amount: Some(delivery.delivery_amount.to_string()),
            notes: delivery.notes.clone(),
        }
    }
}

// =========================================================================
// Field parsing
// =========================================================================

fn field<'a>(value: &'a Option<String>) -> Option<&'a str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, SkipReason> {
    field(value).ok_or(SkipReason::MissingField(name))
}

/// Parse a date in ISO form, tolerating a trailing time or US-style dates
pub fn parse_date(s: &str) -> Result<NaiveDate, SkipReason> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .map_err(|_| SkipReason::BadDate(s.to_string()))
}

fn parse_number(s: &str, name: &'static str) -> Result<f64, SkipReason> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SkipReason::BadNumber {
            field: name,
            value: s.to_string(),
        })
}

fn parse_days(s: &str, name: &'static str) -> Result<u32, SkipReason> {
    if let Ok(days) = s.parse::<u32>() {
        return Ok(days);
    }
    // Spreadsheets often export whole numbers as "3.0"
    let value = parse_number(s, name)?;
    if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(SkipReason::BadNumber {
            field: name,
            value: s.to_string(),
        })
    }
}

// =========================================================================
// Typed record checks
// =========================================================================

/// Constraints every stock reading must satisfy
pub fn check_reading(reading: &StockReading) -> Result<(), SkipReason> {
    if reading.item_name.trim().is_empty() {
        return Err(SkipReason::MissingField("item_name"));
    }
    if !reading.current_stock.is_finite() {
        return Err(SkipReason::BadNumber {
            field: "current_stock",
            value: reading.current_stock.to_string(),
        });
    }
    if reading.current_stock < 0.0 {
        return Err(SkipReason::NegativeStock(reading.current_stock));
    }
    Ok(())
}

/// Constraints every delivery must satisfy
pub fn check_delivery(delivery: &DeliveryRecord) -> Result<(), SkipReason> {
    if delivery.item_name.trim().is_empty() {
        return Err(SkipReason::MissingField("item_name"));
    }
    if !delivery.delivery_amount.is_finite() || delivery.delivery_amount <= 0.0 {
        return Err(SkipReason::NonPositiveDelivery(delivery.delivery_amount));
    }
    Ok(())
}

// =========================================================================
// Raw row conversion
// =========================================================================

/// Convert a raw stock row; `line` is its 1-based line in the file
pub fn parse_stock_row(raw: &RawStockRow, line: usize) -> RowResult<StockReading> {
    let item_name = field(&raw.item_name).map(str::to_string);
    let date = field(&raw.date).and_then(|d| parse_date(d).ok());
    let skip = |reason| SkippedRow {
        source: RowSource::Stock,
        line: Some(line),
        item_name: item_name.clone(),
        date,
        reason,
    };

    let reading = (|| -> Result<StockReading, SkipReason> {
        let date = parse_date(required(&raw.date, "Date")?)?;
        let name = required(&raw.item_name, "Item_Name")?;
        let stock = parse_number(required(&raw.current_stock, "Current_Stock")?, "Current_Stock")?;
        let reading = StockReading::new(date, name, stock);
        check_reading(&reading)?;
        Ok(reading)
    })();

    reading.map_err(skip)
}

/// Convert a raw delivery row; `line` is its 1-based line in the file
pub fn parse_delivery_row(raw: &RawDeliveryRow, line: usize) -> RowResult<DeliveryRecord> {
    let item_name = field(&raw.item_name).map(str::to_string);
    let date = field(&raw.date).and_then(|d| parse_date(d).ok());
    let skip = |reason| SkippedRow {
        source: RowSource::Delivery,
        line: Some(line),
        item_name: item_name.clone(),
        date,
        reason,
    };

    let delivery = (|| -> Result<DeliveryRecord, SkipReason> {
        let date = parse_date(required(&raw.date, "Date")?)?;
        let name = required(&raw.item_name, "Item_Name")?;
        let amount = parse_number(
            required(&raw.delivery_amount, "Delivery_Amount")?,
            "Delivery_Amount",
        )?;
        let mut delivery = DeliveryRecord::new(date, name, amount);
        delivery.notes = field(&raw.notes).map(str::to_string);
        check_delivery(&delivery)?;
        Ok(delivery)
    })();

    delivery.map_err(skip)
}

/// Convert a raw catalog row; `line` is its 1-based line in the file
pub fn parse_item_row(raw: &RawItemRow, line: usize) -> RowResult<Item> {
    let item_name = field(&raw.name).map(str::to_string);
    let skip = |reason| SkippedRow {
        source: RowSource::Catalog,
        line: Some(line),
        item_name: item_name.clone(),
        date: None,
        reason,
    };

    let item = (|| -> Result<Item, SkipReason> {
        let name = required(&raw.name, "Item_Name")?;
        let unit = field(&raw.unit).unwrap_or("units");
        let min = parse_number(required(&raw.min_threshold, "Min_Threshold")?, "Min_Threshold")?;
        let max = parse_number(required(&raw.max_capacity, "Max_Capacity")?, "Max_Capacity")?;
        let lead = parse_days(required(&raw.lead_time_days, "Lead_Time_Days")?, "Lead_Time_Days")?;
        let cost = match field(&raw.cost_per_unit) {
            Some(c) => parse_number(c, "Cost_Per_Unit")?,
            None => 0.0,
        };
        let mut item = Item::new(name, unit, min, max, lead).with_cost(cost);
        item.supplier = field(&raw.supplier).map(str::to_string);
        item.check().map_err(SkipReason::InvalidItem)?;
        Ok(item)
    })();

    item.map_err(skip)
}
