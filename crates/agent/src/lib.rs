//! The routing engine.
//!
//! A message flows through a small state graph:
//!
//! 1. **Supervisor** classifies the conversation into one [`Route`]
//! 2. A **specialist** runs a reason-and-act loop over its tool roster, or
//!    the **direct responder** answers conversationally and writes memory
//! 3. The traversal ends at `FINISH`
//!
//! [`Concierge`] wraps the graph with per-thread sessions, the processing
//! guard and error recording.
//!
//! [`Route`]: concierge_core::Route

pub mod concierge;
pub mod direct;
pub mod graph;
pub mod reasoning;
pub mod responder;
pub mod session;
pub mod specialist;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use concierge::{Components, Concierge, ERROR_MARKER};
pub use direct::DirectResponder;
pub use graph::Graph;
pub use reasoning::{LoopOutcome, ReasoningLoop};
pub use responder::{Next, Responder, ResponderOutput};
pub use session::{ProcessingGuard, SessionStore};
pub use specialist::SpecialistResponder;
pub use supervisor::Supervisor;
