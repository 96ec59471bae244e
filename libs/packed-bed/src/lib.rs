//! # Packed Bed
//!
//! Model of a bed of spherical particles read from a binary packing.
//!
//! ## Pipeline
//!
//! ```text
//! packing file ──decode──► records ──select/scale──► Vec<Bead> ──► PackedBed
//!                                                                   │
//!                      sphere primitives / sizing fields / mesh copy ◄┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use config::PackedBedConfig;
//! use packed_bed::{ingest, PackedBed};
//!
//! let records = [[0.0, 0.0, 0.0, 2.0], [5.0, 0.0, 0.0, 2.0]];
//! let beads = ingest(&records, &PackedBedConfig::default());
//! let bed = PackedBed::new(beads).unwrap();
//! assert_eq!(bed.bounds().xmin, -1.0);
//! assert_eq!(bed.bounds().radius, 3.5);
//! ```

pub mod bead;
pub mod bed;
pub mod bounds;
pub mod error;
pub mod geometry;
pub mod packing;

pub use bead::Bead;
pub use bed::{ingest, BeadSelection, PackedBed};
pub use bounds::BedBounds;
pub use error::{BedError, BedResult, FormatError};
pub use geometry::{BeadEntity, SizingField};
pub use packing::{decode, encode, read_packing, write_packing, Record};
