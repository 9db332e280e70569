pub mod scanner;
pub mod types;
