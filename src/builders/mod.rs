pub mod borders;
pub mod chart;
pub mod merge;
pub mod rows;
pub mod style;
