pub mod layout;
pub mod sweep;
pub mod writer;
