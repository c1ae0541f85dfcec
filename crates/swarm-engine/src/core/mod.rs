pub mod engine;
pub mod rng;
pub mod scheduler;
pub mod time;
pub mod viewport;

#[cfg(test)]
mod scenarios;
