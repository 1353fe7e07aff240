pub mod area;
pub mod date_range;
pub mod endpoint;
