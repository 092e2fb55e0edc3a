//! End-to-end listing tests.
//!
//! `scenario` pins exact output, `layout` checks column and coverage
//! properties over a mixed program, `sinks` covers output targets and
//! configuration files.

mod layout;
mod scenario;
mod sinks;
