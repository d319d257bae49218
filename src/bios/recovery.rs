//! Runs semantic decoders so a broken structure can't take down the caller.
//!
//! Firmware tables are often inconsistent, a decoder might read a field
//! that this variant of the structure does not have. Both an [`AccessError`]
//! and a panic are converted into a [`DecodeError`] which renders the whole
//! structure, so the offending table entry can be reported.
//!
//! Catching panics needs `panic = "unwind"` (the default).

use super::structure::{Header, Structure, AccessError};

use std::{fmt, error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// What went wrong inside the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
	Access(AccessError),
	/// The message of a panic.
	Panic(String)
}

impl fmt::Display for Fault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Access(e) => e.fmt(f),
			Self::Panic(msg) => f.write_str(msg)
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
	header: Header,
	formatted: Vec<u8>,
	strings: Vec<String>,
	fault: Fault
}

impl DecodeError {
	pub fn new(stru: &Structure, fault: Fault) -> Self {
		Self {
			header: *stru.header(),
			formatted: stru.formatted().to_vec(),
			strings: stru.strings_lossy()
				.map(|s| s.into_owned())
				.collect(),
			fault
		}
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn formatted(&self) -> &[u8] {
		&self.formatted
	}

	/// The string-set decoded as text.
	pub fn strings(&self) -> &[String] {
		&self.strings
	}

	pub fn fault(&self) -> &Fault {
		&self.fault
	}
}

// keeps the format existing tooling greps for, including the typo
impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "parse structure (Header: {}, Data: [", self.header)?;
		for (i, b) in self.formatted.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			write!(f, "{}", b)?;
		}
		write!(f, "] Strings: [{}])  pannic: {}", self.strings.join(" "), self.fault)
	}
}

impl error::Error for DecodeError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match &self.fault {
			Fault::Access(e) => Some(e),
			Fault::Panic(_) => None
		}
	}
}

/// Runs `f` on `stru` and recovers from any fault inside it.
///
/// Prefer [`Structure::decode`].
///
/// The panic hook still runs for a caught panic, with the default hook
/// every panic is printed to stderr in addition to the `log::warn!`.
/// Install a quiet hook with [`std::panic::set_hook`] when decoding many
/// structures if that output is unwanted.
pub fn parse_recovery<T, F>(stru: &Structure, f: F) -> Result<T, DecodeError>
where F: FnOnce(&Structure) -> Result<T, AccessError> {
	let fault = match panic::catch_unwind(AssertUnwindSafe(|| f(stru))) {
		Ok(Ok(v)) => return Ok(v),
		Ok(Err(e)) => Fault::Access(e),
		Err(payload) => Fault::Panic(panic_message(payload))
	};

	let e = DecodeError::new(stru, fault);
	log::warn!("{}", e);
	Err(e)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	match payload.downcast::<String>() {
		Ok(msg) => *msg,
		Err(payload) => payload.downcast_ref::<&'static str>()
			.map(|msg| msg.to_string())
			.unwrap_or_else(|| "unknown panic".into())
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

	#[test]
	fn recovers_panic() {
		let s = slot();
		let e = parse_recovery(&s, |_| -> Result<(), AccessError> {
			panic!("parse panic test")
		}).unwrap_err();

		assert_eq!(
			e.to_string(),
			"parse structure (Header: Type: 9, Length: 17, Handle: 2304, \
			Data: [1 177 13 3 4 1 0 4 1 255 255 255 255] \
			Strings: [PCIe Slot 1])  pannic: parse panic test"
		);
		assert_eq!(*e.fault(), Fault::Panic("parse panic test".into()));
	}

	#[test]
	fn recovers_formatted_panic() {
		let s = slot();
		let e = s.decode(|_| -> Result<(), AccessError> {
			panic!("offset {:#x}", 0x20)
		}).unwrap_err();
		assert_eq!(*e.fault(), Fault::Panic("offset 0x20".into()));
	}

	#[test]
	fn recovers_access_error() {
		let s = slot();
		let e = s.decode(|s| s.get_byte(0x20)).unwrap_err();

		assert_eq!(
			*e.fault(),
			Fault::Access(AccessError::OutOfBounds { start: 0x20, end: 0x21, len: 13 })
		);
		assert_eq!(*e.header(), *s.header());
		assert_eq!(e.formatted(), s.formatted());
		assert_eq!(e.strings(), ["PCIe Slot 1"]);
		assert!(e.to_string().ends_with(
			"pannic: index out of range [32] with length 13"
		));
		assert!(error::Error::source(&e).is_some());
	}

	#[test]
	fn passes_value_through() {
		let s = slot();
		let id = s.decode(|s| s.u16(0x05, 0x07)).unwrap();
		assert_eq!(id, 1);
	}

	#[test]
	fn one_fault_per_structure() {
		let structures = vec![
			slot(),
			Structure::new(Header { kind: 9, len: 5, handle: 1 }, vec![1], vec![]),
			slot()
		];
		let ids: Vec<_> = structures.iter()
			.map(|s| s.decode(|s| s.u16(0x05, 0x07)))
			.collect();

		assert_eq!(ids[0], Ok(1));
		assert!(ids[1].is_err());
		assert_eq!(ids[2], Ok(1));
	}
}
