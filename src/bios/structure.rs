//! A single SMBIOS structure and the bounds checked accessors
//! semantic decoders use to read its fields.
//!
//! Every offset taken by the accessors is relative to the start of the
//! formatted area, so offset 0 is the byte directly after the header.

use super::kind::StructureKind;
use super::recovery::{self, DecodeError};

use std::{fmt, error};
use std::borrow::Cow;

pub const HEADER_LEN: usize = 1 + 1 + 2;

/// Returned by [`Structure::get_string`] if the string number is 0 or the
/// field is not part of this structure.
pub const UNKNOWN: &str = "Unknown";
/// Returned by [`Structure::get_string`] if the string number points past the
/// end of the string-set.
pub const BAD_INDEX: &str = "<BAD INDEX>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct Header {
	/// Specifies the type of structure. Types 0 through 127 (7Fh) are reserved for and
	/// defined by this specification. Types 128 through 256 (80h to FFh) are available for
	/// system- and OEM-specific information.
	pub kind: u8,
	/// Specifies the length of the formatted area of the structure, starting at the Type field.
	/// The length of the structure’s string-set is not included.
	pub len: u8,
	/// Specifies the structure’s handle, a unique 16-bit number in the range 0 to 0FFFEh
	/// (for version 2.0) or 0 to 0FEFFh (for version 2.1 and later). The handle can be used
	/// with the Get SMBIOS Structure function to retrieve a specific structure; the handle
	/// numbers are not required to be contiguous.
	pub handle: u16
}

impl Header {
	/// Returns the length of the formatted area without the header.
	///
	/// Returns `None` if `len` is smaller than the header itself.
	pub fn formatted_len(&self) -> Option<usize> {
		(self.len as usize).checked_sub(HEADER_LEN)
	}

	pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
		let handle = self.handle.to_le_bytes();
		[self.kind, self.len, handle[0], handle[1]]
	}
}

impl fmt::Display for Header {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f, "Type: {}, Length: {}, Handle: {}",
			self.kind, self.len, self.handle
		)
	}
}

/// Returned by the byte accessors if a field does not exist on the structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
	/// The range `start..end` is not inside the formatted area of length `len`.
	OutOfBounds {
		start: usize,
		end: usize,
		len: usize
	},
	/// The range `start..end` has more bytes than the integer can hold.
	Width {
		start: usize,
		end: usize,
		max: usize
	}
}

impl fmt::Display for AccessError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::OutOfBounds { start, end, len } if *end == start.saturating_add(1) => write!(
				f, "index out of range [{}] with length {}", start, len
			),
			Self::OutOfBounds { start, end, len } => write!(
				f, "slice bounds out of range [{}:{}] with length {}",
				start, end, len
			),
			Self::Width { start, end, max } => write!(
				f, "range [{}:{}] is wider than {} bytes", start, end, max
			)
		}
	}
}

impl error::Error for AccessError {}

/// The outcome of a string lookup.
///
/// Use [`StringRef::value`] to tell missing strings apart, the `Display`
/// implementation renders the sentinels [`UNKNOWN`] and [`BAD_INDEX`].
///
/// Strings are kept as the raw firmware bytes, they are only decoded
/// (lossy, invalid UTF-8 becomes U+FFFD) when read as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringRef<'a> {
	Value(&'a [u8]),
	/// String number 0 or the field is not part of the structure.
	Unknown,
	/// The string number has no matching entry in the string-set.
	BadIndex
}

impl<'a> StringRef<'a> {
	pub fn value(&self) -> Option<Cow<'a, str>> {
		self.bytes().map(String::from_utf8_lossy)
	}

	/// The raw bytes of the string without the terminating null.
	pub fn bytes(&self) -> Option<&'a [u8]> {
		match *self {
			Self::Value(s) => Some(s),
			_ => None
		}
	}

	/// The string or the sentinel.
	pub fn to_str(&self) -> Cow<'a, str> {
		match *self {
			Self::Value(s) => String::from_utf8_lossy(s),
			Self::Unknown => Cow::Borrowed(UNKNOWN),
			Self::BadIndex => Cow::Borrowed(BAD_INDEX)
		}
	}
}

impl fmt::Display for StringRef<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_str())
	}
}

impl PartialEq<str> for StringRef<'_> {
	fn eq(&self, other: &str) -> bool {
		self.to_str() == other
	}
}

impl PartialEq<&str> for StringRef<'_> {
	fn eq(&self, other: &&str) -> bool {
		self.to_str() == *other
	}
}

/// Each structure shall be terminated by a double-null (0000h).
///
/// Once created a structure is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct Structure {
	header: Header,
	formatted: Vec<u8>,
	strings: Vec<Vec<u8>>
}

impl Structure {
	/// Creates a structure from its parts.
	///
	/// The length of `formatted` is not checked against `header.len`,
	/// [`split`](super::table::split) always keeps them consistent.
	pub fn new(header: Header, formatted: Vec<u8>, strings: Vec<String>) -> Self {
		let strings = strings.into_iter()
			.map(String::into_bytes)
			.collect();
		Self::from_raw(header, formatted, strings)
	}

	/// Like [`Structure::new`] but with strings that might not be UTF-8.
	pub fn from_raw(
		header: Header,
		formatted: Vec<u8>,
		strings: Vec<Vec<u8>>
	) -> Self {
		Self { header, formatted, strings }
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn kind(&self) -> StructureKind {
		self.header.kind.into()
	}

	pub fn handle(&self) -> u16 {
		self.header.handle
	}

	/// The formatted area without the header.
	pub fn formatted(&self) -> &[u8] {
		&self.formatted
	}

	/// The raw string-set in the order it appeared, string number 1 is at
	/// position 0.
	pub fn strings(&self) -> &[Vec<u8>] {
		&self.strings
	}

	/// The string-set decoded as text.
	pub fn strings_lossy(&self) -> impl Iterator<Item=Cow<'_, str>> {
		self.strings.iter()
			.map(|s| String::from_utf8_lossy(s))
	}

	pub fn get_byte(&self, offset: usize) -> Result<u8, AccessError> {
		self.formatted.get(offset)
			.copied()
			.ok_or(AccessError::OutOfBounds {
				start: offset,
				end: offset.saturating_add(1),
				len: self.formatted.len()
			})
	}

	/// Returns the bytes `start..end`.
	pub fn get_bytes(&self, start: usize, end: usize) -> Result<&[u8], AccessError> {
		self.formatted.get(start..end)
			.ok_or(AccessError::OutOfBounds {
				start,
				end,
				len: self.formatted.len()
			})
	}

	/// Little endian WORD from the bytes `start..end`.
	pub fn u16(&self, start: usize, end: usize) -> Result<u16, AccessError> {
		self.le_value(start, end, 2).map(|v| v as u16)
	}

	/// Little endian DWORD from the bytes `start..end`.
	pub fn u32(&self, start: usize, end: usize) -> Result<u32, AccessError> {
		self.le_value(start, end, 4).map(|v| v as u32)
	}

	/// Little endian QWORD from the bytes `start..end`.
	///
	/// Every byte of the range counts, so `[01 00 04 01 ff ff ff ff]` reads
	/// as `0xffff_ffff_0104_0001` and never as 0.
	pub fn u64(&self, start: usize, end: usize) -> Result<u64, AccessError> {
		self.le_value(start, end, 8)
	}

	// byte i of the range is shifted by 8 * i
	fn le_value(
		&self,
		start: usize,
		end: usize,
		max: usize
	) -> Result<u64, AccessError> {
		let bytes = self.get_bytes(start, end)?;
		if bytes.len() > max {
			return Err(AccessError::Width { start, end, max })
		}

		Ok(bytes.iter()
			.enumerate()
			.fold(0, |v, (i, b)| v | ((*b as u64) << (8 * i))))
	}

	/// Reads the string number stored at `offset` and looks it up.
	///
	/// `offset` is the position of the string field in the formatted area,
	/// not the string number itself.
	///
	/// | condition | result |
	/// |---|---|
	/// | `offset < 0` | [`StringRef::BadIndex`] |
	/// | `offset` outside the formatted area | [`StringRef::Unknown`] |
	/// | string number is 0 | [`StringRef::Unknown`] |
	/// | string number past the string-set | [`StringRef::BadIndex`] |
	pub fn get_string(&self, offset: isize) -> StringRef<'_> {
		if offset < 0 {
			return StringRef::BadIndex
		}

		match self.formatted.get(offset as usize) {
			Some(num) => self.string(*num),
			None => StringRef::Unknown
		}
	}

	/// Looks up a 1-based string number.
	pub fn string(&self, num: u8) -> StringRef<'_> {
		if num == 0 {
			return StringRef::Unknown
		}

		self.strings.get(num as usize - 1)
			.map(|s| StringRef::Value(s.as_slice()))
			.unwrap_or(StringRef::BadIndex)
	}

	/// Runs a semantic decoder on this structure.
	///
	/// Any [`AccessError`] returned or panic raised by `f` is turned into a
	/// [`DecodeError`] which contains the whole structure.
	pub fn decode<T, F>(&self, f: F) -> Result<T, DecodeError>
	where F: FnOnce(&Self) -> Result<T, AccessError> {
		recovery::parse_recovery(self, f)
	}

	/// Serializes the structure the way it is laid out in the table.
	pub fn to_bytes(&self) -> Vec<u8> {
		let strings_len: usize = self.strings.iter()
			.map(|s| s.len() + 1)
			.sum();
		let mut bytes = Vec::with_capacity(
			HEADER_LEN + self.formatted.len() + strings_len + 2
		);

		bytes.extend_from_slice(&self.header.to_bytes());
		bytes.extend_from_slice(&self.formatted);
		for s in &self.strings {
			bytes.extend_from_slice(s);
			bytes.push(0);
		}
		// an empty string-set still needs both nulls
		if self.strings.is_empty() {
			bytes.push(0);
		}
		bytes.push(0);

		bytes
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn slot() -> Structure {
		Structure::new(
			Header { kind: 9, len: 17, handle: 2304 },
			vec![
				0x1, 0xb1, 0xd, 0x3, 0x4, 0x1, 0x0, 0x4, 0x1,
				0xff, 0xff, 0xff, 0xff
			],
			vec!["PCIe Slot 1".into()]
		)
	}

	fn memory_device() -> Structure {
		Structure::new(
			Header { kind: 17, len: 92, handle: 0x26 },
			vec![0x01, 0x02, 0x03, 0x04],
			vec!["CPU0_DIMM_A1".into(), "NODE 0".into()]
		)
	}

	#[test]
	fn get_byte() {
		let s = slot();
		assert_eq!(s.get_byte(0x0b).unwrap(), 0xff);
		assert_eq!(s.get_byte(0x00).unwrap(), 0x01);
	}

	#[test]
	fn get_byte_out_of_bounds() {
		let s = slot();
		assert_eq!(
			s.get_byte(13).unwrap_err(),
			AccessError::OutOfBounds { start: 13, end: 14, len: 13 }
		);
	}

	#[test]
	fn get_bytes() {
		let s = slot();
		assert_eq!(s.get_bytes(0x09, 0x0b).unwrap(), &[0xff, 0xff]);
		assert_eq!(s.get_bytes(0x00, 0x0d).unwrap().len(), 13);
		assert!(s.get_bytes(0x0c, 0x0e).is_err());
		// reversed ranges are never valid
		assert!(s.get_bytes(0x05, 0x04).is_err());
	}

	#[test]
	fn integers() {
		let s = slot();
		assert_eq!(s.u16(0x05, 0x07).unwrap(), 0x0001);
		assert_eq!(s.u16(0x07, 0x09).unwrap(), 0x0104);
		assert_eq!(s.u32(0x05, 0x09).unwrap(), 0x0104_0001);
		assert_eq!(s.u64(0x05, 0x0d).unwrap(), 0xffff_ffff_0104_0001);
		assert_eq!(s.u64(0x00, 0x01).unwrap(), 0x01);
	}

	#[test]
	fn integer_width() {
		let s = slot();
		assert_eq!(
			s.u16(0x00, 0x03).unwrap_err(),
			AccessError::Width { start: 0, end: 3, max: 2 }
		);
		assert!(matches!(
			s.u32(0x0b, 0x0f),
			Err(AccessError::OutOfBounds { .. })
		));
	}

	#[test]
	fn string() {
		let s = slot();
		assert_eq!(s.get_string(0), "PCIe Slot 1");
		assert_eq!(s.get_string(0).value().as_deref(), Some("PCIe Slot 1"));
		assert_eq!(s.get_string(0).bytes(), Some(&b"PCIe Slot 1"[..]));
	}

	#[test]
	fn string_negative_offset() {
		let s = slot();
		assert_eq!(s.get_string(-1), StringRef::BadIndex);
		assert_eq!(s.get_string(-100), BAD_INDEX);
	}

	#[test]
	fn string_offset_out_of_bounds() {
		let s = slot();
		assert_eq!(s.get_string(13), StringRef::Unknown);
		assert_eq!(s.get_string(100), UNKNOWN);
	}

	#[test]
	fn string_number_zero() {
		let s = Structure::new(
			Header { kind: 17, len: 10, handle: 0x26 },
			vec![0x00, 0x01, 0x02],
			vec!["String1".into(), "String2".into()]
		);
		assert_eq!(s.get_string(0), "Unknown");
		assert_eq!(s.get_string(1), "String1");
		assert_eq!(s.get_string(2), "String2");
	}

	#[test]
	fn string_number_out_of_bounds() {
		let s = memory_device();
		assert_eq!(s.get_string(0), "CPU0_DIMM_A1");
		assert_eq!(s.get_string(1), "NODE 0");
		assert_eq!(s.get_string(2), "<BAD INDEX>");
		assert_eq!(s.get_string(3), "<BAD INDEX>");
		assert_eq!(s.get_string(3).value(), None);
	}

	#[test]
	fn string_by_number() {
		let s = memory_device();
		assert_eq!(s.string(0), StringRef::Unknown);
		assert_eq!(s.string(2), StringRef::Value(b"NODE 0"));
		assert_eq!(s.string(255), StringRef::BadIndex);
	}

	#[test]
	fn string_ref_display() {
		assert_eq!(StringRef::Unknown.to_string(), "Unknown");
		assert_eq!(StringRef::BadIndex.to_string(), "<BAD INDEX>");
		assert_eq!(StringRef::Value(b"NODE 0").to_string(), "NODE 0");
	}

	#[test]
	fn header() {
		let header = Header { kind: 9, len: 17, handle: 2304 };
		assert_eq!(header.formatted_len(), Some(13));
		assert_eq!(header.to_bytes(), [9, 17, 0x00, 0x09]);
		assert_eq!(header.to_string(), "Type: 9, Length: 17, Handle: 2304");

		let header = Header { kind: 1, len: 3, handle: 0 };
		assert_eq!(header.formatted_len(), None);
	}

	#[test]
	fn to_bytes() {
		let mut expected = vec![9, 17, 0x00, 0x09];
		expected.extend_from_slice(slot().formatted());
		expected.extend_from_slice(b"PCIe Slot 1\0\0");
		assert_eq!(slot().to_bytes(), expected);

		let empty = Structure::new(
			Header { kind: 127, len: 4, handle: 0xfeff },
			vec![],
			vec![]
		);
		assert_eq!(empty.to_bytes(), [127, 4, 0xff, 0xfe, 0, 0]);
	}

	#[test]
	fn kind() {
		assert_eq!(slot().kind(), StructureKind::SystemSlots);
		assert_eq!(memory_device().kind(), StructureKind::MemoryDevice);
	}
}
