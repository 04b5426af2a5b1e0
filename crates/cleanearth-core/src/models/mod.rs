pub mod analysis_types;
pub mod selection_types;
pub mod shell_types;
