pub mod content;
pub mod fsops;
pub mod growth;
pub mod path_safety;
pub mod plan;
pub mod report;
pub mod runner;
pub mod sizing;
pub mod spec;
pub mod tree_copy;
