//! Itinerary domain - the capture/enrich workflow and its persistence.

pub mod memory;
pub mod models;
pub mod schema;
pub mod store;
pub mod visuals;
pub mod workflow;

pub use memory::MemoryItineraryStore;
pub use models::{
    AccommodationInfo, AiStatus, ItemStatus, ItemType, ItineraryItem, LockLease, TransportInfo,
};
pub use store::{
    ItemDraft, ItemPatch, ItineraryStore, ListFilter, LockUpdate, NotionItineraryStore, StoreError,
};
pub use workflow::{CaptureOutcome, CaptureRequest, EnrichOutcome, StatusReport, WorkflowError};
