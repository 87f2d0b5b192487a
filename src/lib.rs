pub mod agent;
pub mod errors;
pub mod graph;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod systems;
