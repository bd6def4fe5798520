pub mod builder;
pub mod schedule;
pub mod table;
