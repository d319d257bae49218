//! Splits the raw structure table into [`Structure`]s.
//!
//! The table is a flat sequence of structures fully packed together:
//! a 4 byte header, the rest of the formatted area and a string-set
//! terminated by a double-null.

use super::structure::{Header, Structure, HEADER_LEN};
use super::kind::StructureKind;

use std::{fmt, io, error};
use simple_bytes::{Bytes, BytesRead, BytesReadRef};
use memchr::memmem;

pub type Result<T> = std::result::Result<T, Error>;

/// Type of the structure that marks the end of the table.
pub const END_OF_TABLE: u8 = 127;

/// Every variant contains the offset of the structure inside the table and
/// as much of the structure as could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// Less than 4 bytes left for the next header.
	TruncatedHeader {
		offset: usize,
		available: usize
	},
	/// The header says the structure is shorter than the header itself.
	MalformedHeader {
		offset: usize,
		header: Header
	},
	/// The formatted area goes past the end of the table.
	TruncatedFormatted {
		offset: usize,
		header: Header,
		available: usize
	},
	/// The table ends before the double-null of the string-set.
	UnterminatedStringBlock {
		offset: usize,
		header: Header,
		formatted: Vec<u8>
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::TruncatedHeader { offset, available } => write!(
				f, "truncated header at offset {}: {} bytes left",
				offset, available
			),
			Self::MalformedHeader { offset, header } => write!(
				f, "malformed header at offset {} ({})", offset, header
			),
			Self::TruncatedFormatted { offset, header, available } => write!(
				f, "truncated formatted area at offset {} ({}): {} bytes left",
				offset, header, available
			),
			Self::UnterminatedStringBlock { offset, header, formatted } => write!(
				f, "unterminated string-set at offset {} ({}, Data: {:?})",
				offset, header, formatted
			)
		}
	}
}

impl error::Error for Error {}

impl From<Error> for io::Error {
	fn from(e: Error) -> Self {
		Self::new(io::ErrorKind::InvalidData, e)
	}
}

/// Splits `bytes` into structures.
///
/// Only the first `total_len` bytes are looked at, 0 means the whole slice.
/// Stops after the End-of-Table structure or when all bytes are consumed.
pub fn split(bytes: &[u8], total_len: usize) -> Result<Vec<Structure>> {
	let len = match total_len {
		0 => bytes.len(),
		l => l.min(bytes.len())
	};
	let mut reader = Bytes::from(&bytes[..len]);
	let mut structures = vec![];

	while !reader.remaining().is_empty() {
		let offset = len - reader.remaining().len();
		let stru = read_structure(&mut reader, offset)?;
		log::trace!(
			"structure at {:#x}: {} ({})",
			offset, stru.kind(), stru.header()
		);

		let end = stru.header().kind == END_OF_TABLE;
		structures.push(stru);

		if end {
			let rest = reader.remaining().len();
			if rest > 0 {
				log::debug!("ignoring {} bytes after End-of-Table", rest);
			}
			break
		}
	}

	log::debug!("split {} structures from {} bytes", structures.len(), len);

	Ok(structures)
}

fn read_structure<'a>(
	reader: &mut impl BytesReadRef<'a>,
	offset: usize
) -> Result<Structure> {
	let available = reader.remaining().len();
	if available < HEADER_LEN {
		return Err(Error::TruncatedHeader { offset, available })
	}

	let header = Header {
		kind: reader.read_le_u8(),
		len: reader.read_le_u8(),
		handle: reader.read_le_u16()
	};

	let formatted_len = header.formatted_len()
		.ok_or(Error::MalformedHeader { offset, header })?;

	let available = reader.remaining().len();
	if available < formatted_len {
		return Err(Error::TruncatedFormatted { offset, header, available })
	}

	let formatted = reader.read_ref(formatted_len);
	let end_pos = memmem::find(reader.remaining(), &[0u8, 0u8])
		.ok_or_else(|| Error::UnterminatedStringBlock {
			offset,
			header,
			formatted: formatted.to_vec()
		})?;
	let strings = reader.read_ref(end_pos);
	let _null_null = reader.read(2);

	Ok(Structure::from_raw(header, formatted.to_vec(), parse_strings(strings)))
}

// strings are separated with \0, kept as raw bytes
fn parse_strings(set: &[u8]) -> Vec<Vec<u8>> {
	if set.is_empty() {
		return vec![]
	}

	set.split(|b| *b == 0)
		.map(<[u8]>::to_vec)
		.collect()
}

/// All structures of a table in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
	structures: Vec<Structure>
}

impl Table {
	/// See [`split`].
	pub fn split(bytes: &[u8], total_len: usize) -> Result<Self> {
		split(bytes, total_len).map(Self::from_structures)
	}

	pub fn from_structures(structures: Vec<Structure>) -> Self {
		Self { structures }
	}

	pub fn structures(&self) -> impl Iterator<Item=&Structure> {
		self.structures.iter()
	}

	/// Returns the first structure with the given type.
	pub fn find(&self, kind: StructureKind) -> Option<&Structure> {
		self.structures().find(|s| s.kind() == kind)
	}

	pub fn filter(&self, kind: StructureKind) -> impl Iterator<Item=&Structure> {
		self.structures().filter(move |s| s.kind() == kind)
	}

	pub fn by_handle(&self, handle: u16) -> Option<&Structure> {
		self.structures().find(|s| s.handle() == handle)
	}

	pub fn len(&self) -> usize {
		self.structures.len()
	}

	pub fn is_empty(&self) -> bool {
		self.structures.is_empty()
	}

	pub fn into_structures(self) -> Vec<Structure> {
		self.structures
	}
}
