//! Command handlers for the gaussparse binary

pub mod batch;
