//! Tagged single-line run logging with graceful sink degradation.

pub mod line;
