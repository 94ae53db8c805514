//! End-to-end engine scenarios against in-memory and temporary databases.

use litegraph::Engine;

mod create_tests;
mod delete_tests;
mod match_tests;
mod merge_tests;
mod param_tests;
mod statement_tests;
mod write_tests;

pub fn test_engine() -> Engine {
    Engine::open_in_memory().expect("in-memory engine")
}
