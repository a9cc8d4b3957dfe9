//! # courier-tracker
//!
//! Order status tracking: identifier extraction, the status provider,
//! the polling session state machine, and the per-channel session registry.

pub mod order_id;
pub mod pause;
pub mod provider;
pub mod registry;
pub mod session;

pub use order_id::{extract_order_id, OrderId};
pub use pause::{Pause, TokioPause};
pub use provider::{HttpStatusProvider, OrderPhase, OrderStatus, StatusProvider};
pub use registry::ActiveSessions;
pub use session::{Destination, SessionOutcome, SessionState, TrackingSession};
