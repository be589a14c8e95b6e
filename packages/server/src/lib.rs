// Tripflow - Itinerary API Core
//
// This crate provides the backend API for a personal travel-itinerary
// planner: quick capture of places (optionally from a bare URL), AI
// enrichment of captured URLs, and day-by-day scheduling, persisted in a
// Notion database.

pub mod config;
pub mod data_migrations;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
