//! Decoders for a few common structure types.
//!
//! All offsets are relative to the formatted area, so they are 4 less than
//! the offsets listed in DSP0134. Fields that were added in later versions
//! of the specification are `Option`s, strings of older variants decode as
//! `"Unknown"`.

use super::structure::{Structure, AccessError};
use super::recovery::DecodeError;

use uuid::Uuid;

type Result<T> = std::result::Result<T, AccessError>;

/// BIOS Information (Type 0)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct BiosInformation {
	pub vendor: String,
	/// Free-form string that may contain Core and OEM version information.
	pub version: String,
	/// Segment location of BIOS starting address (for example, 0E800h).
	pub starting_segment: u16,
	/// Either mm/dd/yy or mm/dd/yyyy.
	pub release_date: String,
	/// Size (n) where 64K * (n+1) is the size of the physical device
	/// containing the BIOS. FFh means 16MB or greater.
	pub rom_size: u8,
	/// Defines which functions the BIOS supports: PCI, PCMCIA, Flash, etc.
	pub characteristics: u64,
	/// 2.4+, 0FFh if not supported.
	pub major: Option<u8>,
	pub minor: Option<u8>,
	/// 2.4+, 0FFh if the embedded controller firmware is not upgradeable.
	pub ec_major: Option<u8>,
	pub ec_minor: Option<u8>
}

impl BiosInformation {
	pub fn decode(stru: &Structure) -> std::result::Result<Self, DecodeError> {
		stru.decode(Self::read)
	}

	fn read(s: &Structure) -> Result<Self> {
		Ok(Self {
			vendor: s.get_string(0x00).to_string(),
			version: s.get_string(0x01).to_string(),
			starting_segment: s.u16(0x02, 0x04)?,
			release_date: s.get_string(0x04).to_string(),
			rom_size: s.get_byte(0x05)?,
			characteristics: s.u64(0x06, 0x0e)?,
			major: s.get_byte(0x10).ok(),
			minor: s.get_byte(0x11).ok(),
			ec_major: s.get_byte(0x12).ok(),
			ec_minor: s.get_byte(0x13).ok()
		})
	}
}

/// System Information (Type 1)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct SystemInformation {
	pub manufacturer: String,
	pub product_name: String,
	pub version: String,
	pub serial_number: String,
	/// 2.1+
	pub uuid: Option<Uuid>,
	/// Identifies the event that caused the system to power up.
	pub wake_up_kind: Option<u8>,
	/// 2.4+, identifies a particular computer configuration for sale.
	pub sku_number: String,
	/// 2.4+, the family to which a particular computer belongs.
	pub family: String
}

impl SystemInformation {
	pub fn decode(stru: &Structure) -> std::result::Result<Self, DecodeError> {
		stru.decode(Self::read)
	}

	fn read(s: &Structure) -> Result<Self> {
		Ok(Self {
			manufacturer: s.get_string(0x00).to_string(),
			product_name: s.get_string(0x01).to_string(),
			version: s.get_string(0x02).to_string(),
			serial_number: s.get_string(0x03).to_string(),
			uuid: s.get_bytes(0x04, 0x14).ok().map(smbios_uuid),
			wake_up_kind: s.get_byte(0x14).ok(),
			sku_number: s.get_string(0x15).to_string(),
			family: s.get_string(0x16).to_string()
		})
	}
}

// the first three fields are stored little endian (2.6+)
fn smbios_uuid(raw: &[u8]) -> Uuid {
	let mut bytes = [0u8; 16];
	bytes.copy_from_slice(raw);
	bytes[0..4].reverse();
	bytes[4..6].reverse();
	bytes[6..8].reverse();
	Uuid::from_bytes(bytes)
}

/// System Slots (Type 9)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct SystemSlot {
	pub designation: String,
	pub slot_kind: u8,
	pub data_bus_width: u8,
	/// 03h available, 04h in use
	pub current_usage: u8,
	pub slot_length: u8,
	pub id: u16,
	pub characteristics1: u8,
	/// 2.1+
	pub characteristics2: Option<u8>,
	/// 2.6+
	pub segment_group: Option<u16>,
	pub bus: Option<u8>,
	pub device_function: Option<u8>
}

impl SystemSlot {
	pub fn decode(stru: &Structure) -> std::result::Result<Self, DecodeError> {
		stru.decode(Self::read)
	}

	fn read(s: &Structure) -> Result<Self> {
		Ok(Self {
			designation: s.get_string(0x00).to_string(),
			slot_kind: s.get_byte(0x01)?,
			data_bus_width: s.get_byte(0x02)?,
			current_usage: s.get_byte(0x03)?,
			slot_length: s.get_byte(0x04)?,
			id: s.u16(0x05, 0x07)?,
			characteristics1: s.get_byte(0x07)?,
			characteristics2: s.get_byte(0x08).ok(),
			segment_group: s.u16(0x09, 0x0b).ok(),
			bus: s.get_byte(0x0b).ok(),
			device_function: s.get_byte(0x0c).ok()
		})
	}

	pub fn in_use(&self) -> bool {
		self.current_usage == 0x04
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub enum MemorySize {
	NotInstalled,
	Unknown,
	Kilobytes(u32),
	Megabytes(u32)
}

impl MemorySize {
	// `extended` is only looked at if size is 7FFFh
	fn from_fields(size: u16, extended: Option<u32>) -> Self {
		match size {
			0 => Self::NotInstalled,
			0xffff => Self::Unknown,
			0x7fff => match extended {
				Some(ext) => Self::Megabytes(ext & 0x7fff_ffff),
				None => Self::Unknown
			},
			s if s & 0x8000 != 0 => Self::Kilobytes((s & 0x7fff) as u32),
			s => Self::Megabytes(s as u32)
		}
	}

	pub fn as_kilobytes(&self) -> Option<u64> {
		match *self {
			Self::Kilobytes(kb) => Some(kb as u64),
			Self::Megabytes(mb) => Some(mb as u64 * 1024),
			_ => None
		}
	}
}

/// Memory Device (Type 17)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct MemoryDevice {
	pub array_handle: u16,
	pub total_width: u16,
	pub data_width: u16,
	pub size: MemorySize,
	pub form_factor: u8,
	pub device_locator: String,
	pub bank_locator: String,
	pub memory_kind: u8,
	/// 2.3+, in MT/s, `None` if unknown.
	pub speed: Option<u16>,
	pub manufacturer: String,
	pub serial_number: String,
	pub asset_tag: String,
	pub part_number: String,
	/// 2.7+, in MT/s, `None` if unknown.
	pub configured_speed: Option<u16>
}

impl MemoryDevice {
	pub fn decode(stru: &Structure) -> std::result::Result<Self, DecodeError> {
		stru.decode(Self::read)
	}

	fn read(s: &Structure) -> Result<Self> {
		let size = s.u16(0x08, 0x0a)?;
		Ok(Self {
			array_handle: s.u16(0x00, 0x02)?,
			total_width: s.u16(0x04, 0x06)?,
			data_width: s.u16(0x06, 0x08)?,
			size: MemorySize::from_fields(size, s.u32(0x18, 0x1c).ok()),
			form_factor: s.get_byte(0x0a)?,
			device_locator: s.get_string(0x0c).to_string(),
			bank_locator: s.get_string(0x0d).to_string(),
			memory_kind: s.get_byte(0x0e)?,
			speed: s.u16(0x11, 0x13).ok().filter(|s| *s != 0),
			manufacturer: s.get_string(0x13).to_string(),
			serial_number: s.get_string(0x14).to_string(),
			asset_tag: s.get_string(0x15).to_string(),
			part_number: s.get_string(0x16).to_string(),
			configured_speed: s.u16(0x1c, 0x1e).ok().filter(|s| *s != 0)
		})
	}

	pub fn is_installed(&self) -> bool {
		self.size != MemorySize::NotInstalled
	}
}
