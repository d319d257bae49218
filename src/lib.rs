//!
//! A crate that splits the SMBIOS/DMI structure table into its structures
//! and lets you read their fields without risking out of bounds reads.
//! Firmware tables are often inconsistent between vendors, so every
//! accessor either returns an error or a sentinel string instead of
//! panicking.
//!
//! ```
//! use smbios_info::bios::{split, StructureKind};
//!
//! let raw = b"\x09\x06\x00\x09\x01\xb1PCIe Slot 1\0\0\x7f\x04\xff\xfe\0\0";
//! let structures = split(raw, raw.len()).unwrap();
//! assert_eq!(structures[0].kind(), StructureKind::SystemSlots);
//! assert_eq!(structures[0].get_string(0), "PCIe Slot 1");
//! assert_eq!(structures[0].get_string(5), "Unknown");
//! ```
//!
//! ## Logging
//! Uses the `log` facade, install any logger to see what gets split and
//! which structures fail to decode.

/// Read and decode the SMBIOS structure table.
pub mod bios;
