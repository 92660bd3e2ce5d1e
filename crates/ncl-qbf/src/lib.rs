//! ncl-qbf: quantified boolean formulas and their NCL circuits.
//!
//! [`Qbf::parse`] reads `forall x exists y : (x||!y)&&(y)`; [`compile_qbf`]
//! wires one quantifier gadget per binding, one CNF evaluator, and the fixed
//! boundary circuitry into a fresh [`ncl_graph::Graph`] whose initial position
//! satisfies every constraint. The formula is true iff the first quantifier's
//! `satout` can eventually be driven into the sink.

pub mod compile;
pub mod parse;

pub use compile::{Circuit, Compiler, compile_qbf};
pub use parse::{Binding, Qbf, Quantifier};
