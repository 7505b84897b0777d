mod admission;
mod notifier;
mod state_builder;

pub use admission::spawn_admission_purge;
pub use state_builder::build_app_state;
