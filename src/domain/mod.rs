// Experiment analytics domain
pub mod analytics;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
