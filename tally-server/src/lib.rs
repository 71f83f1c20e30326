//! tally-server — bookkeeping backend
//!
//! REST service for a small business ledger: products, customers, orders
//! with line items, expenses, dashboard statistics, spreadsheet export,
//! cross-device photo upload, and daily database backups.

pub mod api;
pub mod config;
pub mod db;
pub mod services;
pub mod state;
