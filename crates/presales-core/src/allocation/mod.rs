pub mod sale_month;
pub mod units;
