//! Supported devices and their build target identifiers
//!
//! The public device name used on the command line does not always match
//! the identifiers the toolchains expect: `nanosp` builds as `nanosplus`
//! for Rust apps, `nanos2` for C apps, and is listed as `nanos+` in app
//! manifests. All of that lives in one table indexed by [`Device`].

use clap::ValueEnum;
use std::fmt;

/// Flag bit OR-ed into `appFlags` for devices in the extra-flag subset
pub const EXTRA_APP_FLAG: u32 = 0x200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Device {
    Nanos,
    Nanox,
    Nanosp,
    Stax,
    Flex,
    #[value(name = "apex_m")]
    ApexM,
    #[value(name = "apex_p")]
    ApexP,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTargets {
    pub device: Device,
    pub name: &'static str,
    /// Key of the per-device table in Rust package metadata
    pub rust_target: &'static str,
    /// SDK `TARGET` value
    pub c_target: &'static str,
    /// Spelling used in `ledger_app.toml` device lists
    pub manifest_name: &'static str,
    pub extra_flag: bool,
    /// Whether `list-apps` can filter on this device
    pub listable: bool,
}

// Order must follow the `Device` discriminants.
static DEVICE_TABLE: [DeviceTargets; 7] = [
    DeviceTargets {
        device: Device::Nanos,
        name: "nanos",
        rust_target: "nanos",
        c_target: "nanos",
        manifest_name: "nanos",
        extra_flag: false,
        listable: true,
    },
    DeviceTargets {
        device: Device::Nanox,
        name: "nanox",
        rust_target: "nanox",
        c_target: "nanox",
        manifest_name: "nanox",
        extra_flag: true,
        listable: true,
    },
    DeviceTargets {
        device: Device::Nanosp,
        name: "nanosp",
        rust_target: "nanosplus",
        c_target: "nanos2",
        manifest_name: "nanos+",
        extra_flag: false,
        listable: true,
    },
    DeviceTargets {
        device: Device::Stax,
        name: "stax",
        rust_target: "stax",
        c_target: "stax",
        manifest_name: "stax",
        extra_flag: true,
        listable: true,
    },
    DeviceTargets {
        device: Device::Flex,
        name: "flex",
        rust_target: "flex",
        c_target: "flex",
        manifest_name: "flex",
        extra_flag: true,
        listable: true,
    },
    DeviceTargets {
        device: Device::ApexM,
        name: "apex_m",
        rust_target: "apex_m",
        c_target: "apex_m",
        manifest_name: "apex_m",
        extra_flag: true,
        listable: false,
    },
    DeviceTargets {
        device: Device::ApexP,
        name: "apex_p",
        rust_target: "apex_p",
        c_target: "apex_p",
        manifest_name: "apex_p",
        extra_flag: true,
        listable: false,
    },
];

impl Device {
    pub fn targets(self) -> &'static DeviceTargets {
        &DEVICE_TABLE[self as usize]
    }

    pub fn all() -> impl Iterator<Item = Device> {
        DEVICE_TABLE.iter().map(|t| t.device)
    }

    /// Devices `list-apps` selects when asked for `all`, in table order
    pub fn listable() -> impl Iterator<Item = Device> {
        DEVICE_TABLE.iter().filter(|t| t.listable).map(|t| t.device)
    }

    pub fn from_manifest_name(name: &str) -> Option<Device> {
        DEVICE_TABLE
            .iter()
            .find(|t| t.manifest_name == name)
            .map(|t| t.device)
    }

    pub fn rust_target(self) -> &'static str {
        self.targets().rust_target
    }

    pub fn c_target(self) -> &'static str {
        self.targets().c_target
    }

    pub fn manifest_name(self) -> &'static str {
        self.targets().manifest_name
    }

    /// Applies the device-specific flag rule to raw app flags
    pub fn adjust_app_flags(self, flags: u32) -> u32 {
        if self.targets().extra_flag {
            flags | EXTRA_APP_FLAG
        } else {
            flags
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.targets().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn test_table_matches_discriminants() {
        for device in Device::all() {
            assert_eq!(device.targets().device, device);
        }
        assert_eq!(Device::all().count(), Device::value_variants().len());
    }

    #[test]
    fn test_cli_names_match_table() {
        for device in Device::value_variants() {
            let value = device.to_possible_value().unwrap();
            assert_eq!(value.get_name(), device.targets().name);
            assert_eq!(Device::from_str(value.get_name(), false), Ok(*device));
        }
    }

    #[parameterized(
        nanos = { Device::Nanos, "nanos", "nanos" },
        nanox = { Device::Nanox, "nanox", "nanox" },
        nanosp = { Device::Nanosp, "nanosplus", "nanos2" },
        stax = { Device::Stax, "stax", "stax" },
        flex = { Device::Flex, "flex", "flex" },
        apex_m = { Device::ApexM, "apex_m", "apex_m" },
        apex_p = { Device::ApexP, "apex_p", "apex_p" },
    )]
    fn test_target_remapping(device: Device, rust_target: &str, c_target: &str) {
        assert_eq!(device.rust_target(), rust_target);
        assert_eq!(device.c_target(), c_target);
    }

    #[parameterized(
        nanos = { Device::Nanos, 0x000, 0x000 },
        nanosp = { Device::Nanosp, 0x040, 0x040 },
        nanox = { Device::Nanox, 0x000, 0x200 },
        stax = { Device::Stax, 0x040, 0x240 },
        flex = { Device::Flex, 0x200, 0x200 },
        apex_m = { Device::ApexM, 0x001, 0x201 },
        apex_p = { Device::ApexP, 0x800, 0xa00 },
    )]
    fn test_adjust_app_flags(device: Device, raw: u32, expected: u32) {
        assert_eq!(device.adjust_app_flags(raw), expected);
    }

    #[test]
    fn test_manifest_names() {
        assert_eq!(Device::Nanosp.manifest_name(), "nanos+");
        assert_eq!(Device::from_manifest_name("nanos+"), Some(Device::Nanosp));
        assert_eq!(Device::from_manifest_name("nanosp"), None);
        assert_eq!(Device::from_manifest_name("stax"), Some(Device::Stax));
    }

    #[test]
    fn test_listable_devices() {
        let listable: Vec<_> = Device::listable().collect();
        assert_eq!(
            listable,
            vec![
                Device::Nanos,
                Device::Nanox,
                Device::Nanosp,
                Device::Stax,
                Device::Flex
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Device::ApexM.to_string(), "apex_m");
        assert_eq!(Device::Nanosp.to_string(), "nanosp");
    }
}
