mod generator;
mod sleep;

pub use sleep::*;
