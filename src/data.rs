mod config_occlusion;
mod execution_type;
mod fill;
mod time_calc;

pub use config_occlusion::ConfigOcclusion;
pub use execution_type::ExecutionType;
pub use fill::{DefaultFill, Fill, FillPolicy};
pub use time_calc::TimeCalc;
