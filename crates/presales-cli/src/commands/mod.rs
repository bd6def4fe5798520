pub mod allocation;
pub mod cash_flow;
