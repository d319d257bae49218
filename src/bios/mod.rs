//!
//! See example `dmidecode_mini` on how to use this.
//!
//! The structure table is split into [`Structure`]s by [`split`], fields are
//! read with the bounds checked accessors of [`Structure`]. A decoder that
//! reads past the end of a structure gets an [`AccessError`], and
//! [`Structure::decode`] turns that (or a panic) into a [`DecodeError`]
//! which describes the whole structure.
//!
//! ## Support
//! SMBIOS 2.1+ with the 32-bit entry point and SMBIOS 3.0+.
//!
//! To be able to use [`Bios::read`] the following files need to exist
//! `/sys/firmware/dmi/tables/{smbios_entry_point, DMI}` and you need permission
//! to read them.

pub mod structure;
pub mod table;
pub mod recovery;
pub mod kind;
pub mod entry_point;
pub mod decode;

use std::io;

pub use uuid::Uuid;

pub use structure::{
	Header, Structure, StringRef, AccessError, UNKNOWN, BAD_INDEX
};
pub use table::{split, Table};
pub use recovery::{parse_recovery, DecodeError, Fault};
pub use kind::StructureKind;
pub use entry_point::EntryPoint;
pub use decode::{
	BiosInformation, SystemInformation, SystemSlot, MemoryDevice, MemorySize
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bios {
	entry_point: EntryPoint,
	table: Table
}

impl Bios {
	pub fn read() -> io::Result<Self> {
		let entry_point = EntryPoint::read()?;
		Ok(Self {
			table: Table::read_from(&entry_point, entry_point::STRUCTURES_PATH)?,
			entry_point
		})
	}

	pub fn from_parts(entry_point: EntryPoint, table: Table) -> Self {
		Self { entry_point, table }
	}

	pub fn entry_point(&self) -> &EntryPoint {
		&self.entry_point
	}

	pub fn table(&self) -> &Table {
		&self.table
	}

	/// Returns `None` if the table has no BIOS Information structure.
	pub fn bios_info(&self) -> Option<Result<BiosInformation, DecodeError>> {
		self.table.find(StructureKind::BiosInformation)
			.map(BiosInformation::decode)
	}

	/// Returns `None` if the table has no System Information structure.
	pub fn system_info(&self) -> Option<Result<SystemInformation, DecodeError>> {
		self.table.find(StructureKind::SystemInformation)
			.map(SystemInformation::decode)
	}

	/// Every slot is decoded on its own, a broken one only returns an error
	/// for itself.
	pub fn slots(&self) -> impl Iterator<Item=Result<SystemSlot, DecodeError>> + '_ {
		self.table.filter(StructureKind::SystemSlots)
			.map(SystemSlot::decode)
	}

	pub fn memory_devices(
		&self
	) -> impl Iterator<Item=Result<MemoryDevice, DecodeError>> + '_ {
		self.table.filter(StructureKind::MemoryDevice)
			.map(MemoryDevice::decode)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn raw_table() -> Vec<u8> {
		let mut v = vec![];
		// system information 2.0
		v.extend_from_slice(&[1, 8, 0x01, 0x00, 1, 2, 0, 0]);
		v.extend_from_slice(b"LENOVO\020HQS0EG02\0\0");
		// slot
		v.extend_from_slice(&[9, 17, 0x00, 0x09]);
		v.extend_from_slice(&[
			0x1, 0xb1, 0xd, 0x3, 0x4, 0x1, 0x0, 0x4, 0x1,
			0xff, 0xff, 0xff, 0xff
		]);
		v.extend_from_slice(b"PCIe Slot 1\0\0");
		// slot cut off after the designation
		v.extend_from_slice(&[9, 6, 0x01, 0x09, 0x1, 0xb1]);
		v.extend_from_slice(b"PCIe Slot 2\0\0");
		v.extend_from_slice(&[127, 4, 0xff, 0xfe, 0, 0]);
		v
	}

	fn bios() -> Bios {
		let entry_point = EntryPoint::parse(&[
			b'_', b'S', b'M', b'3', b'_', 0, 0x18, 3, 2, 0, 1, 0,
			0, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0
		]).unwrap();
		Bios::from_parts(entry_point, Table::split(&raw_table(), 0).unwrap())
	}

	#[test]
	fn system_info() {
		let bios = bios();
		let info = bios.system_info().unwrap().unwrap();
		assert_eq!(info.manufacturer, "LENOVO");
		assert_eq!(info.product_name, "20HQS0EG02");
		assert_eq!(info.version, "Unknown");
		assert_eq!(info.uuid, None);
		assert_eq!(info.family, "Unknown");
		assert!(bios.bios_info().is_none());
	}

	#[test]
	fn slots_fail_on_their_own() {
		let bios = bios();
		let slots: Vec<_> = bios.slots().collect();
		assert_eq!(slots.len(), 2);
		assert_eq!(slots[0].as_ref().unwrap().designation, "PCIe Slot 1");

		let e = slots[1].as_ref().unwrap_err();
		assert_eq!(e.header().handle, 0x0901);
		assert!(e.to_string().starts_with(
			"parse structure (Header: Type: 9, Length: 6, Handle: 2305, \
			Data: [1 177] Strings: [PCIe Slot 2])  pannic: "
		));
	}

	#[test]
	fn no_memory_devices() {
		assert_eq!(bios().memory_devices().count(), 0);
		assert_eq!(bios().entry_point().table_len, 0x100);
	}
}
