pub mod combat;
pub mod dispatch;
pub mod error;
pub mod formation;
pub mod identifiers;
pub mod intent;
pub mod managers;
pub mod squad;
pub mod squadsystem;
pub mod status;
pub mod store;
pub mod threatmap;
pub mod world;
