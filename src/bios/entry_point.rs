//! Entry point parsing, see https://www.dmtf.org/sites/default/files/standards/documents/DSP0134_3.4.0.pdf
//!
//! Both the 64-bit (`_SM3_`) and the 32-bit (`_SM_`) entry point are
//! supported. The access method is only available via
//! the files /sys/firmware/dmi/tables/{smbios_entry_point, DMI}

use super::table::{self, Table};

use std::path::Path;
use std::{fmt, fs, io, error};
use simple_bytes::{Bytes, BytesRead};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// Meaning the file could not be found or we don't have enough permission
	EntryPointNotFound,
	/// Neither `_SM3_` nor `_SM_` was found
	AnchorStringIncorrect,
	/// If something is not correct with the entry point struct.
	/// Note the checksum is ignored.
	EntryPointMalformed,
	/// Meaning the file DMI could not be found or we don't have enough
	/// permissions
	StructuresNotFound,
	/// The DMI file is larger than the maximum the entry point allows
	StructuresTooLarge {
		len: usize,
		max: u32
	},
	/// The table could not be split
	StructuresMalformed(table::Error)
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::StructuresTooLarge { len, max } => write!(
				f, "structure table has {} bytes but max is {}", len, max
			),
			Self::StructuresMalformed(e) => write!(f, "structure table: {}", e),
			e => fmt::Debug::fmt(e, f)
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Self::StructuresMalformed(e) => Some(e),
			_ => None
		}
	}
}

impl From<table::Error> for Error {
	fn from(e: table::Error) -> Self {
		Self::StructuresMalformed(e)
	}
}

impl From<Error> for io::Error {
	fn from(e: Error) -> Self {
		let kind = match e {
			Error::EntryPointNotFound |
			Error::StructuresNotFound => io::ErrorKind::NotFound,
			Error::StructuresMalformed(_) => io::ErrorKind::InvalidData,
			_ => io::ErrorKind::Other
		};
		Self::new(kind, e)
	}
}

pub const ENTRY_POINT_PATH: &str = "/sys/firmware/dmi/tables/smbios_entry_point";
pub const STRUCTURES_PATH: &str = "/sys/firmware/dmi/tables/DMI";

const ANCHOR_STRING_3: [u8; 5] = *b"_SM3_";
const ANCHOR_STRING_2: [u8; 4] = *b"_SM_";
const INTERMEDIATE_ANCHOR: [u8; 5] = *b"_DMI_";
const ENTRY_POINT_3_LEN: usize = 0x18;
const ENTRY_POINT_2_LEN: usize = 0x1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPointKind {
	/// 32-bit entry point, SMBIOS 2.1 up to 2.8
	Smbios2,
	/// 64-bit entry point, SMBIOS 3.0 and later
	Smbios3
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
	pub kind: EntryPointKind,
	/// Checksum of the Entry Point Structure (EPS)
	pub checksum: u8,
	/// Length of the Entry Point Structure, starting with the Anchor String
	/// field, in bytes
	pub len: u8,
	/// Major version of this specification implemented in the table
	/// structures (for example, the value is 0Ah for revision 10.22 and
	/// 02h for revision 2.1)
	pub major: u8,
	/// Minor version of this specification implemented in the table
	/// structures (for example, the value is 16h for revision 10.22 and
	/// 01h for revision 2.1)
	pub minor: u8,
	/// Identifies the docrev of this specification, always 0 for the
	/// 32-bit entry point.
	pub docrev: u8,
	/// For `Smbios3` the maximum size of the structure table, the actual
	/// size is guaranteed to be less or equal. For `Smbios2` the exact
	/// length.
	pub table_len: u32,
	/// The physical starting address of the read-only SMBIOS
	/// Structure Table.
	pub table_addr: u64,
	/// Only available in the 32-bit entry point.
	pub structure_count: Option<u16>
}

impl EntryPoint {
	/// Only the anchor strings are checked.
	pub fn parse(buf: &[u8]) -> Result<Self> {
		if buf.starts_with(&ANCHOR_STRING_3) {
			Self::parse_v3(buf)
		} else if buf.starts_with(&ANCHOR_STRING_2) {
			Self::parse_v2(buf)
		} else {
			Err(Error::AnchorStringIncorrect)
		}
	}

	fn parse_v3(buf: &[u8]) -> Result<Self> {
		if buf.len() < ENTRY_POINT_3_LEN {
			return Err(Error::EntryPointMalformed)
		}

		let mut bytes = Bytes::from(buf);
		let _anchor = bytes.read(ANCHOR_STRING_3.len());

		let checksum = bytes.read_le_u8();
		let len = bytes.read_le_u8();
		let major = bytes.read_le_u8();
		let minor = bytes.read_le_u8();
		let docrev = bytes.read_le_u8();
		let _revision = bytes.read_le_u8();
		let _reserved = bytes.read_le_u8();

		Ok(Self {
			kind: EntryPointKind::Smbios3,
			checksum,
			len,
			major,
			minor,
			docrev,
			table_len: bytes.read_le_u32(),
			table_addr: bytes.read_le_u64(),
			structure_count: None
		})
	}

	fn parse_v2(buf: &[u8]) -> Result<Self> {
		if buf.len() < ENTRY_POINT_2_LEN {
			return Err(Error::EntryPointMalformed)
		}

		let mut bytes = Bytes::from(buf);
		let _anchor = bytes.read(ANCHOR_STRING_2.len());

		let checksum = bytes.read_le_u8();
		let len = bytes.read_le_u8();
		let major = bytes.read_le_u8();
		let minor = bytes.read_le_u8();
		let _max_structure_size = bytes.read_le_u16();
		let _revision = bytes.read_le_u8();
		let _formatted_area = bytes.read(5);

		if bytes.read(INTERMEDIATE_ANCHOR.len()) != INTERMEDIATE_ANCHOR {
			return Err(Error::EntryPointMalformed)
		}
		let _intermediate_checksum = bytes.read_le_u8();

		let table_len = bytes.read_le_u16() as u32;
		let table_addr = bytes.read_le_u32() as u64;
		let structure_count = bytes.read_le_u16();

		Ok(Self {
			kind: EntryPointKind::Smbios2,
			checksum,
			len,
			major,
			minor,
			docrev: 0,
			table_len,
			table_addr,
			structure_count: Some(structure_count)
		})
	}

	pub fn read() -> Result<Self> {
		Self::read_from(ENTRY_POINT_PATH)
	}

	pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
		let buf = fs::read(path)
			.map_err(|_| Error::EntryPointNotFound)?;
		Self::parse(&buf)
	}

	/// Returns true if the table is at least version `major.minor`.
	pub fn is_later(&self, major: u8, minor: u8) -> bool {
		(self.major, self.minor) >= (major, minor)
	}
}

impl Table {
	/// Reads and splits the table at the default sysfs locations.
	pub fn read() -> Result<Self> {
		let entry_point = EntryPoint::read()?;
		Self::read_from(&entry_point, STRUCTURES_PATH)
	}

	/// Reads and splits the table in `path` with the size taken from the
	/// entry point.
	pub fn read_from(
		entry_point: &EntryPoint,
		path: impl AsRef<Path>
	) -> Result<Self> {
		let buf = fs::read(path)
			.map_err(|_| Error::StructuresNotFound)?;

		if entry_point.kind == EntryPointKind::Smbios3
			&& entry_point.table_len != 0
			&& buf.len() > entry_point.table_len as usize
		{
			return Err(Error::StructuresTooLarge {
				len: buf.len(),
				max: entry_point.table_len
			})
		}

		let table = Table::split(&buf, entry_point.table_len as usize)?;
		log::debug!(
			"read SMBIOS {}.{} table with {} structures",
			entry_point.major, entry_point.minor, table.len()
		);

		Ok(table)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn entry_point_3() -> Vec<u8> {
		let mut v = b"_SM3_".to_vec();
		// checksum, len, major, minor, docrev, revision, reserved
		v.extend_from_slice(&[0xa5, 0x18, 3, 4, 0, 1, 0]);
		v.extend_from_slice(&0x0fe2u32.to_le_bytes());
		v.extend_from_slice(&0x7ae0_9000u64.to_le_bytes());
		v
	}

	fn entry_point_2() -> Vec<u8> {
		let mut v = b"_SM_".to_vec();
		// checksum, len, major, minor
		v.extend_from_slice(&[0x1c, 0x1f, 2, 8]);
		v.extend_from_slice(&0x0100u16.to_le_bytes());
		v.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
		v.extend_from_slice(b"_DMI_");
		v.push(0x42);
		v.extend_from_slice(&0x0a2bu16.to_le_bytes());
		v.extend_from_slice(&0x000f_0000u32.to_le_bytes());
		v.extend_from_slice(&0x0031u16.to_le_bytes());
		v.push(0x28);
		v
	}

	#[test]
	fn parse_v3() {
		let ep = EntryPoint::parse(&entry_point_3()).unwrap();
		assert_eq!(ep.kind, EntryPointKind::Smbios3);
		assert_eq!(ep.len, 0x18);
		assert_eq!((ep.major, ep.minor), (3, 4));
		assert_eq!(ep.table_len, 0x0fe2);
		assert_eq!(ep.table_addr, 0x7ae0_9000);
		assert_eq!(ep.structure_count, None);
		assert!(ep.is_later(3, 0));
		assert!(!ep.is_later(3, 5));
	}

	#[test]
	fn parse_v2() {
		let raw = entry_point_2();
		assert_eq!(raw.len(), ENTRY_POINT_2_LEN);

		let ep = EntryPoint::parse(&raw).unwrap();
		assert_eq!(ep.kind, EntryPointKind::Smbios2);
		assert_eq!((ep.major, ep.minor), (2, 8));
		assert_eq!(ep.table_len, 0x0a2b);
		assert_eq!(ep.table_addr, 0x000f_0000);
		assert_eq!(ep.structure_count, Some(0x31));
	}

	#[test]
	fn bad_anchor() {
		assert_eq!(
			EntryPoint::parse(b"_SM4_aaaaaaaaaaaaaaaaaaaaaaa").unwrap_err(),
			Error::AnchorStringIncorrect
		);
	}

	#[test]
	fn too_short() {
		let raw = entry_point_3();
		assert_eq!(
			EntryPoint::parse(&raw[..10]).unwrap_err(),
			Error::EntryPointMalformed
		);

		let mut raw = entry_point_2();
		raw[0x10] = b'X';
		assert_eq!(
			EntryPoint::parse(&raw).unwrap_err(),
			Error::EntryPointMalformed
		);
	}

	#[test]
	fn missing_files() {
		assert_eq!(
			EntryPoint::read_from("/nonexistent/smbios_entry_point").unwrap_err(),
			Error::EntryPointNotFound
		);

		let ep = EntryPoint::parse(&entry_point_3()).unwrap();
		let e = Table::read_from(&ep, "/nonexistent/DMI").unwrap_err();
		assert_eq!(e, Error::StructuresNotFound);
		let e: io::Error = e.into();
		assert_eq!(e.kind(), io::ErrorKind::NotFound);
	}
}
