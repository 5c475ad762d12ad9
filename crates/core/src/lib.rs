#![deny(unsafe_code)]
//! Core types for the noisy-gradient generative art tool.
//!
//! Provides the [`Configuration`] model with its partial updates and lenient
//! input coercion, the curated [`Palette`] set, the [`Xorshift64`] PRNG,
//! the random composition generator ([`generate`]) and the render surface
//! that turns a configuration into a serializable [`Scene`].

pub mod config;
pub mod error;
pub mod generate;
pub mod palette;
pub mod params;
pub mod prng;
pub mod scene;

pub use config::{
    BlendMode, BlobLayer, ConfigPatch, Configuration, NoisePatch, NoiseSettings, NoiseType,
};
pub use error::ArtError;
pub use generate::{generate, Composition};
pub use palette::Palette;
pub use prng::Xorshift64;
pub use scene::{render, Circle, Scene};
