pub mod activation;
pub mod readiness;
pub mod scheduler;
