//! Structure types as listed in DSP0134 3.x.

use std::fmt;

macro_rules! structure_kind {
	($($name:ident = $val:literal => $desc:literal),*) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		#[cfg_attr(
			feature = "serde",
			derive(serde1::Serialize, serde1::Deserialize),
			serde(crate = "serde1")
		)]
		pub enum StructureKind {
			$($name),*,
			/// Types 128 through 255 are available for system- and
			/// OEM-specific information.
			Oem(u8),
			/// Reserved but not yet defined.
			Unknown(u8)
		}

		impl StructureKind {
			pub fn as_u8(&self) -> u8 {
				match self {
					$(Self::$name => $val),*,
					Self::Oem(num) | Self::Unknown(num) => *num
				}
			}

			/// The name dmidecode uses for this type.
			pub fn name(&self) -> &'static str {
				match self {
					$(Self::$name => $desc),*,
					Self::Oem(_) => "OEM-specific",
					Self::Unknown(_) => "Unknown"
				}
			}
		}

		impl From<u8> for StructureKind {
			fn from(num: u8) -> Self {
				match num {
					$($val => Self::$name),*,
					128..=255 => Self::Oem(num),
					_ => Self::Unknown(num)
				}
			}
		}
	}
}

structure_kind! {
	BiosInformation = 0 => "BIOS",
	SystemInformation = 1 => "System",
	BaseBoardInformation = 2 => "Base Board",
	SystemEnclosure = 3 => "Chassis",
	ProcessorInformation = 4 => "Processor",
	MemoryController = 5 => "Memory Controller",
	MemoryModule = 6 => "Memory Module",
	CacheInformation = 7 => "Cache",
	PortConnector = 8 => "Port Connector",
	SystemSlots = 9 => "System Slots",
	OnBoardDevices = 10 => "On Board Devices",
	OemStrings = 11 => "OEM Strings",
	SystemConfigurationOptions = 12 => "System Configuration Options",
	BiosLanguage = 13 => "BIOS Language",
	GroupAssociations = 14 => "Group Associations",
	SystemEventLog = 15 => "System Event Log",
	PhysicalMemoryArray = 16 => "Physical Memory Array",
	MemoryDevice = 17 => "Memory Device",
	MemoryError32 = 18 => "32-bit Memory Error",
	MemoryArrayMappedAddress = 19 => "Memory Array Mapped Address",
	MemoryDeviceMappedAddress = 20 => "Memory Device Mapped Address",
	BuiltInPointingDevice = 21 => "Built-in Pointing Device",
	PortableBattery = 22 => "Portable Battery",
	SystemReset = 23 => "System Reset",
	HardwareSecurity = 24 => "Hardware Security",
	SystemPowerControls = 25 => "System Power Controls",
	VoltageProbe = 26 => "Voltage Probe",
	CoolingDevice = 27 => "Cooling Device",
	TemperatureProbe = 28 => "Temperature Probe",
	ElectricalCurrentProbe = 29 => "Electrical Current Probe",
	OutOfBandRemoteAccess = 30 => "Out-of-band Remote Access",
	BootIntegrityServices = 31 => "Boot Integrity Services",
	SystemBoot = 32 => "System Boot",
	MemoryError64 = 33 => "64-bit Memory Error",
	ManagementDevice = 34 => "Management Device",
	ManagementDeviceComponent = 35 => "Management Device Component",
	ManagementDeviceThresholdData = 36 => "Management Device Threshold Data",
	MemoryChannel = 37 => "Memory Channel",
	IpmiDevice = 38 => "IPMI Device",
	SystemPowerSupply = 39 => "Power Supply",
	AdditionalInformation = 40 => "Additional Information",
	OnboardDevicesExtended = 41 => "Onboard Device",
	ManagementControllerHostInterface = 42 => "Management Controller Host Interface",
	TpmDevice = 43 => "TPM Device",
	ProcessorAdditionalInformation = 44 => "Processor Additional Information",
	FirmwareInventoryInformation = 45 => "Firmware Inventory Information",
	StringProperty = 46 => "String Property",
	Inactive = 126 => "Inactive",
	EndOfTable = 127 => "End Of Table"
}

impl fmt::Display for StructureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names() {
		assert_eq!(StructureKind::SystemBoot.to_string(), "System Boot");
		assert_eq!(StructureKind::MemoryDevice.name(), "Memory Device");
		assert_eq!(StructureKind::Oem(0xdd).name(), "OEM-specific");
	}

	#[test]
	fn from_u8() {
		assert_eq!(StructureKind::from(9), StructureKind::SystemSlots);
		assert_eq!(StructureKind::from(127), StructureKind::EndOfTable);
		assert_eq!(StructureKind::from(128), StructureKind::Oem(128));
		assert_eq!(StructureKind::from(100), StructureKind::Unknown(100));
	}

	#[test]
	fn round_trip_all() {
		for num in 0..=255u8 {
			assert_eq!(StructureKind::from(num).as_u8(), num);
		}
	}
}
