//! Numerical routines
//!
//! Event detection reduces every candidate event to the earliest positive real root of
//! a polynomial of degree ≤ 4. This module owns that reduction.

pub mod poly;
pub mod quartic;
pub mod roots;

pub use poly::C64;
pub use roots::{
    QuarticSolver, is_admissible, min_positive_root, min_real_root, min_real_roots, roots,
    solve_transcendental,
};
