pub use crate::archive;
pub use crate::archive::{Archive, ArchiveManager, Backend, PackBuilder, RawFile};

pub use crate::res;
pub use crate::res::{
    AssetFactory, AssetPayload, CacheSlot, OwnerToken, Resource, ResourceIdentifier,
    ResourceInitData, ResourceLoader, ResourceManager,
};

pub use crate::res::cursor::{ByteCursor, Endian};

pub use crate::sched;
pub use crate::sched::{Priority, Promise};

pub use crate::errors::{Error, Result};

pub use crate::utils;
pub use crate::utils::HashValue;
