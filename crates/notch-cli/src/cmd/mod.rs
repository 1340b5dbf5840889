pub mod order;
pub mod serve;
