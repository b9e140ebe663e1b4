pub mod client;
pub mod denial;
pub mod document;
pub mod errors;
pub mod executor;
pub mod query;
pub mod selection;
