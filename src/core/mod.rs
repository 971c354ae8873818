pub mod field;
pub mod traits;

pub use field::{HaloField, HaloView};
pub use traits::{Dimension, Problem};
