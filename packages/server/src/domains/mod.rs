//! Domain modules.

pub mod itinerary;
