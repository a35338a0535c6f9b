// SPDX-License-Identifier: GPL-3.0-or-later

pub mod svd;

use std::collections::BTreeSet;
use anyhow::{bail, Result};

/// Read-only description of a microcontroller, built once from its SVD.
#[derive(Debug, Clone, Default)]
pub struct Device {
    pub name: String,
    pub cpu: Option<String>,
    pub peripherals: Vec<Peripheral>,
}

#[derive(Debug, Clone, Default)]
pub struct Peripheral {
    pub name: String,
    // Peripherals sharing a group name are instances of the same block
    pub group_name: String,
    pub base_address: u64,
    pub registers: Vec<Register>,
}

#[derive(Debug, Clone, Default)]
pub struct Register {
    pub name: String,
    pub description: String,
    pub address_offset: u32,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default)]
pub struct Field {
    pub name: String,
    pub description: String,
    pub bit_width: u32,
    pub bit_offset: u32,
    /// None behaves as read-write
    pub access: Option<Access>,
    pub is_reserved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

impl Field {
    pub fn is_reserved_name(name: &str) -> bool {
        name.to_ascii_uppercase().starts_with("RESERVED")
    }
}

impl Peripheral {
    /// Rejects models that would render into malformed declarations.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.group_name.is_empty() {
            bail!("Peripheral at base=0x{:08x} has an empty name", self.base_address);
        }

        let mut register_names = BTreeSet::new();
        for reg in &self.registers {
            if reg.name.is_empty() {
                bail!("{} has a register with an empty name at offset=0x{:02x}",
                    self.name, reg.address_offset);
            }
            if !register_names.insert(reg.name.as_str()) {
                bail!("{} declares register {} more than once", self.name, reg.name);
            }

            for field in &reg.fields {
                if field.name.is_empty() {
                    bail!("{}.{} has a field with an empty name at bit={}",
                        self.name, reg.name, field.bit_offset);
                }
                if field.bit_width == 0 {
                    bail!("{}.{}.{} has a bit width of 0", self.name, reg.name, field.name);
                }
                if field.bit_offset as u64 + field.bit_width as u64 > 64 {
                    bail!("{}.{}.{} spans bits {}..{} which exceeds 64 bits",
                        self.name, reg.name, field.name,
                        field.bit_offset, field.bit_offset + field.bit_width);
                }
            }
        }

        Ok(())
    }
}
