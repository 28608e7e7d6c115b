//! Cultural transmission

pub mod meme;

pub use meme::Meme;
