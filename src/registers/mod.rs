//! Register model for the nRF905
//! Field layout from nRF905_PS_v1.5.pdf, chapter 10

mod config;
mod frequency;

pub use config::*;
pub use frequency::*;
