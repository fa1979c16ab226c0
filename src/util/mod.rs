pub mod message;
pub mod parser;
pub mod progress;
pub mod result;
