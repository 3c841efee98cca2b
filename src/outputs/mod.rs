//! Output generation for the slideshow feeds.
//!
//! # Output Structure
//!
//! ```text
//! assets.json                  # ebird-static
//! birdslide/assets.json        # ebird-browser
//! inatslide/observations.json  # inat
//! ```
//!
//! Each run replaces its file wholesale; nothing is merged or kept.

pub mod json;
