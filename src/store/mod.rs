//! External collaborators for persistence and identity.
//!
//! Everything non-trivial the dashboard talks to is injected through the
//! traits in this module rather than reached through globals: the record
//! store for the harvest log, the identity provider for record ownership,
//! the blob store for photos, and the control sink for actuator toggles.

mod blob;
mod control;
mod identity;
mod records;

pub use blob::{BlobStore, DirBlobStore};
pub use control::{ControlSink, FileControlSink, NoopControlSink};
pub use identity::{EnvIdentity, IdentityProvider, StaticIdentity, ANONYMOUS_USER};
pub use records::{HarvestRecord, JsonRecordStore, MemoryRecordStore, NewHarvest, RecordStore};
