pub mod returns;

pub use returns::{family_for, sample, sample_with, NormalFamily, StudentTFamily, VariateFamily};
