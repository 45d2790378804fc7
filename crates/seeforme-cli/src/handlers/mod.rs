//! Command handlers.

pub mod describe;
pub mod languages;
pub mod run;
pub mod voices;
