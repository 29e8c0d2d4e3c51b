mod common;

mod apply_tests;
mod plan_tests;
