pub mod analysis;
pub mod file_selection;
pub mod navigation;
pub mod permissions;
pub mod readiness;
