// lib.rs
pub mod align_report;
pub mod config;
pub mod input;
pub mod interval;
pub mod inventory;
pub mod natural_sort;
pub mod output;
pub mod pipeline;
pub mod seq_report;
pub mod stats;
