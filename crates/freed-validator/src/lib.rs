//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Packet validator, listener and conformance suite exports."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Validation side of the FreeD toolkit.
//!
//! [`PacketValidator`] classifies buffers through the codec and tallies the
//! outcomes, [`Listener`] feeds it from a UDP socket, and
//! [`conformance`] carries the offline test cases behind `freed test`.

pub mod conformance;
pub mod listener;
pub mod report;
pub mod summary;
pub mod validator;

pub use conformance::{run_suite, standard_cases, CaseResult, ConformanceCase, SuiteReport};
pub use listener::{Listener, ListenerError, ListenerEvent, ListenerExit};
pub use report::PacketReport;
pub use summary::{SummaryCounter, ValidationSummary};
pub use validator::PacketValidator;
