//! I/O collaborators: rate acquisition, rate cache, batch files and reports.

pub mod bts;
pub mod cache;
pub mod demo;
pub mod report;
pub mod shipments;
pub mod workbook;
