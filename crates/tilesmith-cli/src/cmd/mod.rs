pub mod completions;
pub mod fetch;
pub mod publish;
