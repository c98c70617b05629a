pub mod card;
pub mod catalog;
pub mod colors;
pub mod dealer;
pub mod debug;
pub mod deck;
pub mod error;
pub mod gametable;
pub mod geometry;
pub mod images;
pub mod levels;
pub mod observer;
pub mod playing;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod store;
