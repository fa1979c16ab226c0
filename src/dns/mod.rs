pub mod batch;
pub mod client;
pub mod resolver;
