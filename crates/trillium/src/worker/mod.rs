mod interface;
mod private_ip;
mod random;

pub use interface::*;
pub use private_ip::*;
pub use random::*;
