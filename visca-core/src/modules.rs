pub mod classifier;
pub mod command;
pub mod constants;
pub mod description;
pub mod former;
pub mod nibbles;
