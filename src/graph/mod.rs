//! Kern datastructuren voor projectienodes: waarden, nodes en evaluatie.

pub mod evaluator;
pub mod node;
pub mod value;
