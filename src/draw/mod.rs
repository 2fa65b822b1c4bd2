//! Winner-draw core.
//!
//! Eligibility filtering, random / manual winner selection and the ranking used
//! to display winner history. Persistence is reached only through [`DrawStore`],
//! so the same engine runs against the pool, a caller-owned transaction, or the
//! in-memory store used by the tests.

pub mod eligibility;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use eligibility::resolve_eligible;
pub use engine::{DrawEngine, DrawOptions, DrawnWinner, sample_winners};
pub use error::{DrawError, DrawResult};
pub use ranking::{draw_rounds, format_drawn, format_history, format_winner, rank_positions};
pub use store::{DrawStore, NewWinner, RaffleInfo, RaffleSnapshot, Ticket, WinnerRecord};
