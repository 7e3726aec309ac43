mod decimal;
mod interface;
mod packed;

pub use decimal::*;
pub use interface::*;
pub use packed::*;
