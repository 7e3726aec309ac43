mod lock;
mod mutex;
mod status;
#[cfg(test)]
mod tests;

pub use lock::*;
pub(crate) use mutex::*;
pub use status::*;
