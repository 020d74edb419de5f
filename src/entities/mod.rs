//! Entity type definitions

pub mod consumption;
pub mod finding;
pub mod forecast;
pub mod item;
pub mod recommendation;
pub mod stock;

pub use consumption::ConsumptionRecord;
pub use finding::{AuditFinding, RuleId, Severity};
pub use forecast::{Confidence, ForecastRecord};
pub use item::Item;
pub use recommendation::{RecommendationRecord, Urgency};
pub use stock::{DeliveryRecord, StockReading};
