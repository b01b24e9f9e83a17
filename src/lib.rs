pub mod app;
pub mod audio;
pub mod camera;
pub mod cartoon;
pub mod chat;
pub mod config;
pub mod dream;
pub mod engine;
pub mod error;
pub mod font;
pub mod input;
pub mod renderer;
pub mod rng;
pub mod scene;
pub mod ui;
pub mod window;
pub mod world;
