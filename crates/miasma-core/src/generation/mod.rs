//! Generation - terrain layouts and the initial population

mod layout;
mod population;

pub use layout::*;
pub use population::*;
