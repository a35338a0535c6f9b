// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;
use std::fmt::Write as _;
use anyhow::Result;

use crate::device::Peripheral;
use crate::util::sanitize_ident;

/// Peripherals sharing a group name, in device order.
#[derive(Debug)]
pub struct PeripheralGroup<'a> {
    pub name: String,
    pub instances: Vec<&'a Peripheral>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub address: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseAddress {
    Fixed(u64),
    /// One case per instance, selected by a `Port` value
    Dispatch { selector: String, instances: Vec<Instance> },
}

/// Groups peripherals by group name, keeping the order in which groups first appear.
pub fn group_peripherals(peripherals: &[Peripheral]) -> Vec<PeripheralGroup<'_>> {
    let mut index = BTreeMap::new();
    let mut groups: Vec<PeripheralGroup> = vec![];

    for p in peripherals {
        let i = *index.entry(p.group_name.as_str()).or_insert_with(|| {
            groups.push(PeripheralGroup { name: p.group_name.clone(), instances: vec![] });
            groups.len() - 1
        });
        groups[i].instances.push(p);
    }

    groups
}

impl<'a> PeripheralGroup<'a> {
    /// Instance whose register layout is emitted for the whole group
    pub fn layout(&self) -> &'a Peripheral {
        self.instances[0]
    }

    pub fn base_address(&self) -> BaseAddress {
        match self.instances.as_slice() {
            [p] => BaseAddress::Fixed(p.base_address),
            instances => BaseAddress::Dispatch {
                selector: sanitize_ident(&self.name),
                instances: instances.iter()
                    .map(|p| Instance { name: sanitize_ident(&p.name), address: p.base_address })
                    .collect(),
            },
        }
    }
}

impl BaseAddress {
    pub fn declaration(&self) -> Result<String> {
        match self {
            BaseAddress::Fixed(address) => {
                Ok(format!("static constexpr auto BASE_ADDR = 0x{:08x}U;\n\n", address))
            }
            BaseAddress::Dispatch { selector, instances } => {
                let param = format!("t_{}", selector.to_lowercase());
                let mut s = format!("static constexpr auto BASE_ADDR(Port const& {}) {{\n", param);
                writeln!(s, "\tswitch({}) {{", param)?;
                for instance in instances {
                    writeln!(s, "\tcase Port::{}:", instance.name)?;
                    writeln!(s, "\t\treturn 0x{:08x}U;", instance.address)?;
                }
                s.push_str("\t}\n}\n\n");
                Ok(s)
            }
        }
    }

    /// Template header placed in front of every register declaration, if any.
    pub fn template_header(&self) -> Option<String> {
        match self {
            BaseAddress::Fixed(_) => None,
            BaseAddress::Dispatch { selector, .. } => Some(format!("template <Port {}>\n", selector)),
        }
    }

    /// Expression a register declaration uses for its base address.
    pub fn expression(&self) -> String {
        match self {
            BaseAddress::Fixed(_) => "BASE_ADDR".to_string(),
            BaseAddress::Dispatch { selector, .. } => format!("BASE_ADDR({})", selector),
        }
    }
}
