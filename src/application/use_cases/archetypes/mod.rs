//! Scenario archetypes: keyword classification plus the reference templates
//! attached to prompts when archetypes are enabled.

mod classifier;
mod store;

pub use classifier::classify;
pub use store::ArchetypeStore;
