pub mod raffle_winners;
pub mod raffles;
pub mod tickets;

pub use raffle_winners as raffle_winner_entity;
pub use raffles as raffle_entity;
pub use raffles::RaffleStatus;
pub use tickets as ticket_entity;
pub use tickets::TicketStatus;
