//! Core domain types and logic. No I/O happens here.

pub mod error;
pub mod observation;
pub mod calendar;
pub mod settings;
pub mod inflation;
pub mod rate;
pub mod table;
pub mod consolidation;
pub mod normalize;
pub mod kpi;
pub mod fx;
pub mod projection;
pub mod config_validation;
