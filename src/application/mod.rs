pub mod bootstrap;
pub mod commands;
pub mod slot_resolver;
pub mod synchronizer;
