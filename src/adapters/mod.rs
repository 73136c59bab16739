//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod cached_data_port;
pub mod file_config_adapter;
pub mod csv_report_adapter;
