//! Domain types for volboard

pub mod bar;
pub mod quote;

pub use bar::{Bar, BarError, BarSeries, Granularity};
pub use quote::Quote;
