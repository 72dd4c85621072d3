//! The formula-driven pricing engine (C2, C5): evaluates pricing formulas
//! over exact decimals and slices resource intervals across overlapping
//! plan/VAT/currency validity windows.

pub mod formula;
pub mod money;
pub mod slicer;

pub use formula::Variables;
pub use slicer::{slice, Error, Keyed};
