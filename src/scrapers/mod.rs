//! Feed scrapers, one module per pipeline.
//!
//! | Pipeline | Module | Method | Output |
//! |----------|--------|--------|--------|
//! | eBird (static) | [`ebird_static`] | HTTP + DOM heuristics | `assets.json` |
//! | eBird (browser) | [`ebird_browser`] | Headless Chrome + DOM/markup heuristics | `birdslide/assets.json` |
//! | iNaturalist | [`inat`] | REST API | `inatslide/observations.json` |
//!
//! # Common Patterns
//!
//! Each pipeline module exports:
//! - a trait for its network seam, with a real implementation
//! - `scrape_*`: fetch and extract, substituting fallback data on failure
//! - `run(args)`: the subcommand entry point, which always writes a feed
//!
//! The pipelines share nothing at runtime; the eBird ones share the
//! heuristics in [`heuristics`].

pub mod ebird_browser;
pub mod ebird_static;
pub mod heuristics;
pub mod inat;
