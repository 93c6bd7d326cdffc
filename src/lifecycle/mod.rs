//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (binary or Router::listen_and_serve):
//!     Register routes → Print route listing → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Servers stop accepting → In-flight requests drain → Exit
//!
//! Signals (signals.rs):
//!     Ctrl+C / SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Routes are registered before serving starts; the table is not
//!   expected to change while requests are dispatched

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::trigger_on_ctrl_c;
