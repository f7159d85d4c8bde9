// Baselines: named, account-scoped sets of inventory hosts pinned to a config.
// Flow: intent (validate) → builder (entity graph) → store (persist) → handlers.

pub mod builder;
pub mod handlers;
pub mod intent;
pub mod store;
