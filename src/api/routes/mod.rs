pub mod alerts;
pub mod health;
pub mod snapshot;
pub mod stats;
