//! Integration tests for the gaussparse binaries

mod helpers;

mod batch_test;
mod single_file_test;
