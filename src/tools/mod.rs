pub mod chart;
pub mod format;
pub mod param_enums;
pub mod rows;
pub mod sheets;
pub mod values;
