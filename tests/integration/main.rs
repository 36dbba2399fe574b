//! Integration tests for sysgauge.

mod util;

mod arg_tests;
mod invalid_config_tests;
mod pipeline_tests;
mod valid_config_tests;
