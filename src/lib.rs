//! Stockpile: inventory analytics from plain-text stock counts
//!
//! Derives daily consumption from stock counts and deliveries, audits the data
//! for integrity problems, forecasts when each item runs out, and recommends
//! what to order.

pub mod cli;
pub mod core;
pub mod dataset;
pub mod entities;
pub mod yaml;
