//! A federated read layer for time series. A [`storage::FanoutStorage`] sends each
//! select to every configured backend concurrently and merges the label-sorted results,
//! combining series reported by more than one backend.

pub mod common;
pub mod config;
mod error;
pub mod iterators;
pub mod labels;
pub mod series;
pub mod storage;

pub use error::*;
