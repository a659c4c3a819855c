//! Test utilities and helpers for code built on the tabula container model.
//!
//! This crate provides:
//! - Synthetic data generation: random labels, canned series/frames/panels and
//!   configurable multi-level indexes and tables
//! - Structural comparison of values, indexes, series, frames and panels with
//!   numeric tolerance
//! - Test-lifecycle helpers: temporary paths, network retry/skip policies,
//!   warning capture, attribute mocks and error/panic assertions
//!
//! # Usage
//!
//! ```
//! use tabula_testkit::custom::{FrameSpec, make_custom_dataframe};
//! use tabula_testkit::compare::{FrameCompareOptions, assert_frame_equal};
//!
//! let left = make_custom_dataframe(5, 3, &FrameSpec::default()).unwrap();
//! let right = make_custom_dataframe(5, 3, &FrameSpec::default()).unwrap();
//! assert_frame_equal(&left, &right, &FrameCompareOptions::default()).unwrap();
//! ```

pub mod compare;
pub mod custom;
pub mod data_gen;
pub mod dirs;
pub mod mock;
pub mod network;
pub mod packages;
pub mod raises;
pub mod warnings;

pub use network::TestOutcome;
