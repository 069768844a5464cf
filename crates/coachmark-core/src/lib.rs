#![forbid(unsafe_code)]

//! Core: geometry, cut-out paths, colors, and animation primitives.
//!
//! # Role in Coachmark
//! `coachmark-core` holds the value types the guide engine computes with.
//! It knows nothing about guides, steps, or hosts: it answers "what does
//! this outline look like", "is this point dimmed", and "where is this
//! transition after 80 ms".
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Rect`], [`geometry::Insets`], per-corner radii.
//! - **MaskPath**: overlay bounds plus holes, even-odd coverage, interpolation.
//! - **Animation**: tick-driven [`animation::Fade`] and [`animation::PathTween`].
//!
//! # How it fits in the system
//! The `coachmark` crate builds mask paths from geometry strategies and hands
//! them to its mask surface, which animates them with [`animation::PathTween`].

pub mod animation;
pub mod color;
pub mod event;
pub mod geometry;
pub mod path;
