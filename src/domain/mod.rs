// Domain layer - Core types, rules and run context

pub mod context;
pub mod errors;
pub mod model;
pub mod rules;
