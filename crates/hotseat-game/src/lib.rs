//! The Hotseat game core: per-match session state machines and the
//! process-wide registry that owns them.
//!
//! Everything in this crate is synchronous and single-threaded by
//! design — the router above serializes events, so no session is ever
//! touched by two operations at once. Operations mutate state and
//! return `(Recipient, ServerEvent)` lists; actual delivery is the
//! router's job.
//!
//! # Key types
//!
//! - [`Session`] — one live match: roster, question cursor, answered
//!   set, score accumulation
//! - [`SessionRegistry`] — the pin → session table plus the
//!   connection → pin index
//! - [`PinAllocator`] — random 6-digit join codes
//! - [`GameError`] — every named rejection, with a stable wire code
//! - [`scoring`] — pure answer evaluation and the latency point curve

mod error;
mod registry;
pub mod scoring;
mod session;

pub use error::GameError;
pub use registry::{PinAllocator, SessionRegistry};
pub use session::{
    AdvanceOutcome, DisconnectOutcome, Outbound, Player, Session,
    SessionStatus,
};
