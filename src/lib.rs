//! Album grid layout computation for grouped media messages.
//!
//! Given the ordered items of one album (2–10 photos, videos, or file
//! attachments posted as a single message), computes a space-filling grid
//! arrangement: how many rows, which items share them, each cell's width in
//! virtual-canvas units and height as a canvas fraction, plus the border
//! flags and span metadata a renderer needs to draw a seamless collage.
//! Pure geometry — no pixel operations, no I/O, `no_std` compatible (the
//! layout module needs `alloc` for its output list).
//!
//! # Modules
//!
//! - [`aspect`] — Proportion classes and the cropped ratios used in search
//! - [`border`] — Outer-edge flag set that drives corner rounding
//! - [`media`] — Input vocabulary: items, kinds, group context
//! - [`mosaic`] — Templates, partition search, assignment, post-processing
//! - `svg` — Debug rendering of a computed layout (feature `svg`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod aspect;
pub mod border;
pub mod media;
#[cfg(feature = "alloc")]
pub mod mosaic;
#[cfg(feature = "svg")]
pub mod svg;

// Re-exports: core vocabulary and the engine entry points
pub use aspect::{AspectProfile, Proportion};
pub use border::Borders;
pub use media::{GroupContext, MediaItem, MediaKind};
#[cfg(feature = "alloc")]
pub use mosaic::{
    CANVAS_HEIGHT, CANVAS_WIDTH, Canvas, FULL_ROW_SPAN, GroupLayout, LayoutPosition, layout_group,
};
