//! Produces a subset from the dmidecode command
//! List all structures, then the BIOS, system, slot and memory information

use smbios_info::bios::{Bios, MemorySize};


fn main() {

	let bios = Bios::read().expect("failed to read smbios table");
	let ep = bios.entry_point();

	println!("SMBIOS {}.{} present.", ep.major, ep.minor);
	println!("{} structures occupying {} bytes.", bios.table().len(), ep.table_len);
	println!();

	for stru in bios.table().structures() {
		let header = stru.header();
		println!(
			"Handle {:#06x}, DMI type {}, {} bytes ({})",
			header.handle, header.kind, header.len, stru.kind()
		);
	}
	println!();

	match bios.bios_info() {
		Some(Ok(info)) => {
			println!("Bios Information");
			println!("\tVendor: {}", info.vendor);
			println!("\tVersion: {}", info.version);
			println!("\tRelease Date: {}", info.release_date);
			if let (Some(major), Some(minor)) = (info.major, info.minor) {
				println!("\tBIOS Revision: {}.{}", major, minor);
			}
			println!();
		},
		Some(Err(e)) => eprintln!("{}", e),
		None => {}
	}

	match bios.system_info() {
		Some(Ok(info)) => {
			println!("System Information");
			println!("\tManufacturer: {}", info.manufacturer);
			println!("\tProduct Name: {}", info.product_name);
			println!("\tVersion: {}", info.version);
			println!("\tSerial Number: {}", info.serial_number);
			if let Some(uuid) = info.uuid {
				println!("\tUUID: {}", uuid);
			}
			println!("\tSKU Number: {}", info.sku_number);
			println!("\tFamily: {}", info.family);
			println!();
		},
		Some(Err(e)) => eprintln!("{}", e),
		None => {}
	}

	for slot in bios.slots() {
		match slot {
			Ok(slot) => {
				println!("System Slot Information");
				println!("\tDesignation: {}", slot.designation);
				println!("\tID: {}", slot.id);
				println!(
					"\tCurrent Usage: {}",
					if slot.in_use() { "In Use" } else { "Available" }
				);
				println!();
			},
			Err(e) => eprintln!("{}", e)
		}
	}

	for mem in bios.memory_devices() {
		match mem {
			Ok(mem) => {
				println!("Memory Device");
				match (mem.size, mem.size.as_kilobytes()) {
					(_, Some(kb)) => println!("\tSize: {} MB", kb / 1024),
					(MemorySize::NotInstalled, _) => {
						println!("\tSize: No Module Installed")
					},
					_ => println!("\tSize: Unknown")
				}
				println!("\tLocator: {}", mem.device_locator);
				println!("\tBank Locator: {}", mem.bank_locator);
				if let Some(speed) = mem.speed {
					println!("\tSpeed: {} MT/s", speed);
				}
				println!("\tManufacturer: {}", mem.manufacturer);
				println!("\tPart Number: {}", mem.part_number);
				println!();
			},
			Err(e) => eprintln!("{}", e)
		}
	}

}
