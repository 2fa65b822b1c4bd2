pub mod connection;
pub mod draw_store;

pub use connection::*;
pub use draw_store::SeaOrmDrawStore;
