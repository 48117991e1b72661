//! Receipt field extraction module.

mod parser;
pub mod rules;
mod validation;

pub use parser::ReceiptParser;
pub use validation::CrossValidator;
