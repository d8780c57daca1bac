//! Card system: definitions, capabilities, instances, and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardTypeId`: Opaque type identifier (games define types)
//! - `TypeCapability` / `CapabilityTable`: per-type rules resolved at registration
//! - `CardDefinition`: Static card data (power, rarity, faction, cost)
//! - `CardInstance`: One dealt copy of a definition
//! - `CardRegistry`: Definition and capability lookup

pub mod capability;
pub mod definition;
pub mod instance;
pub mod registry;

pub use capability::{CapabilityTable, TypeCapability};
pub use definition::{CardDefinition, CardId, CardTypeId};
pub use instance::CardInstance;
pub use registry::CardRegistry;
