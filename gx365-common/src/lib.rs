pub mod catalog;
pub mod mapping;
pub mod play_order;
pub mod policy;
pub mod release_clock;
pub mod track_id;

pub use catalog::{CatalogTrack, NextTrack, TrackCatalog};
pub use mapping::TrackMapping;
pub use play_order::PlayOrder;
pub use policy::{Admission, ReleasePolicy};
pub use release_clock::{Clock, Cutoff, FixedClock, ReleaseClock, SystemClock};
pub use track_id::{TestMarker, TrackId};
