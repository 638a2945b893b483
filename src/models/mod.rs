pub mod schedule_models;
pub mod system_models;
