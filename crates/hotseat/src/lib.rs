//! # Hotseat
//!
//! Live multiplayer quiz sessions over WebSockets.
//!
//! A host creates a game from a stored quiz and receives a 6-digit pin;
//! players join with the pin and a nickname; the host steps through the
//! questions while answers are scored by latency. Hotseat owns the live
//! session lifecycle — quiz authoring and long-term storage stay behind
//! the [`QuizCatalog`](hotseat_store::QuizCatalog) and
//! [`SessionStore`](hotseat_store::SessionStore) seams.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotseat::prelude::*;
//! use hotseat_store::{MemoryCatalog, MemoryStore};
//!
//! # async fn run() -> Result<(), HotseatError> {
//! let server = HotseatServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(MemoryCatalog::new(), MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod router;
mod server;

pub use error::HotseatError;
pub use router::EventRouter;
pub use server::{HotseatServer, HotseatServerBuilder};

/// The most common imports for running a Hotseat server.
pub mod prelude {
    pub use crate::{EventRouter, HotseatError, HotseatServer, HotseatServerBuilder};
    pub use hotseat_protocol::{
        Answer, ClientEvent, GamePin, HostId, QuizId, QuizSnapshot,
        ServerEvent,
    };
    pub use hotseat_store::{QuizCatalog, SessionStore};
}
