//! Network Route Collector - kernel routing table metrics
//!
//! This library reads the kernel's links and IPv4/IPv6 routes over netlink and
//! translates them into per-route info records and per-device route counts
//! for a pull-based monitoring system.

pub mod collector;
pub mod config;
pub mod error;
pub mod netlink;

pub use error::{AppError, FetchError};
