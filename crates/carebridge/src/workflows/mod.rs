pub mod audit;
pub mod chat;
pub mod comparison;
pub mod grading;
pub mod prepurchase;
