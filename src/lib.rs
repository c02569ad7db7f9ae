//! agenda — a personal task manager whose manual ordering is backed by
//! fractional position keys.
//!
//! The interesting part lives in [`ops`]: midpoint key allocation
//! ([`ops::position`]), the total display-order comparator and the
//! self-healing position repair ([`ops::ordering`]), and the coordinator
//! that ties them to a [`store::TaskStore`] ([`ops::coordinator`]).

pub mod cli;
pub mod model;
pub mod ops;
pub mod store;
