#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub mod constants;

pub mod app;
pub mod board;
pub mod datalog;
pub mod display;
pub mod frame;
pub mod logger;
pub mod monitor;
pub mod saadc;
pub mod sampler;
pub mod time;

pub use sampler::{VddSampler, VddSource};
