pub mod session;
pub mod connection;
pub mod network_owner;
pub mod pawn;
pub mod pawn_template;
pub mod pawn_event;
pub mod pawn_system_set;
pub mod client;
pub mod assignment;

pub use session::*;
pub use connection::*;
pub use network_owner::*;
pub use pawn::*;
pub use pawn_template::*;
pub use pawn_event::{PawnEvent, ClientEvent};
pub use pawn_system_set::*;
pub use client::*;
pub use assignment::*;
