pub mod caller;
pub mod common;
pub mod raffle;

pub use caller::*;
pub use common::*;
pub use raffle::*;
