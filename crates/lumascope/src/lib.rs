//! Lumascope: per-channel image histogram and brightness statistics with
//! cached previews.
//!
//! A graph-execution host invokes [`services::AnalysisService::analyze`] once
//! per image-producing step; the image is cached under its workflow/node key
//! and the serialized statistics go back to the invoking node. The histogram
//! viewer then pulls `GET /api/histogram/generate?key=...` from the [`web`]
//! layer to fetch the full report plus a downscaled preview, as often as it
//! likes, without re-running the graph.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod models;
pub mod preview;
pub mod services;
pub mod web;
