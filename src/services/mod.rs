pub mod raffle_service;

pub use raffle_service::*;
