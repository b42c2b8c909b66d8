//! Interpretation of the Modbus holding-register space exposed by the
//! WaterFurnace Aurora "ABC" heat pump controller.
//!
//! The ABC speaks plain read/write holding registers; everything interesting
//! is in knowing which addresses exist, which of them the board will answer
//! for, and how to turn the raw words into typed values. Those three concerns
//! live in [`registers`], [`ranges`] and [`decode`] respectively. None of
//! them perform any I/O.

pub mod commands;
pub mod decode;
pub mod ranges;
pub mod registers;
