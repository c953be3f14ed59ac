/// Platform-specific functionality -- fixed-disk volume enumeration.

pub mod volumes;

pub use volumes::{enumerate_volumes, StaticVolumes, SystemVolumes, VolumeSource};
