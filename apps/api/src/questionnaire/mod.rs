pub mod autocomplete;
pub mod catalog;
pub mod flow;
pub mod handlers;
pub mod session;

pub use catalog::Answers;
