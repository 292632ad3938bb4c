// Library root: card dataset, draw engine, and persisted shared games.

pub mod config;
pub mod db;
pub mod deck;
pub mod draw;
pub mod games;
