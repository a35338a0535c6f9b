// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use svd_parser::svd::{self as svd, MaybeArray, PeripheralInfo, RegisterInfo};

use super::{Access, Device, Field, Peripheral, Register};
use crate::util::read_file_str;

pub fn svd_path(svd_dir: &Path, vendor: &str, target: &str) -> PathBuf {
    svd_dir.join(vendor).join(format!("{}.svd", target))
}

/// Resolves a vendor/target pair to a parsed device model.
pub fn load(svd_dir: &Path, vendor: &str, target: &str) -> Result<Device> {
    let path = svd_path(svd_dir, vendor, target);
    if !path.is_file() {
        bail!("No SVD for vendor={} target={} (looked for {})", vendor, target, path.display());
    }

    let xml = read_file_str(&path)?;
    let device = svd_parser::parse(&xml)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Device::try_from(&device)
        .with_context(|| format!("Failed to build device model from {}", path.display()))
}

impl TryFrom<&svd::Device> for Device {
    type Error = anyhow::Error;

    fn try_from(svd: &svd::Device) -> Result<Self> {
        let raw = expand_peripherals(&svd.peripherals);

        let by_name = raw.iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect::<BTreeMap<_, _>>();

        let peripherals = (0..raw.len())
            .map(|i| {
                let (group_name, registers) = resolve_peripheral(&raw, &by_name, i, &mut vec![])?;
                let p = &raw[i];
                Ok(Peripheral {
                    name: p.name.clone(),
                    group_name: group_name.unwrap_or_else(|| p.name.clone()),
                    base_address: p.base_address,
                    registers,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: svd.name.clone(),
            cpu: svd.cpu.as_ref().map(|cpu| cpu.name.clone()),
            peripherals,
        })
    }
}

struct RawPeripheral<'a> {
    info: &'a PeripheralInfo,
    name: String,
    base_address: u64,
}

fn expand_peripherals(peripherals: &[MaybeArray<PeripheralInfo>]) -> Vec<RawPeripheral<'_>> {
    peripherals.iter().flat_map(|p| {
        match p {
            MaybeArray::Single(info) => {
                vec![RawPeripheral { info, name: info.name.clone(), base_address: info.base_address }]
            }
            MaybeArray::Array(info, dim) => {
                dim.indexes().enumerate().map(|(i, index)| RawPeripheral {
                    info,
                    name: expand_dim_name(&info.name, &index),
                    base_address: info.base_address + i as u64 * dim.dim_increment as u64,
                }).collect()
            }
        }
    })
    .collect()
}

// Returns the group name and registers, following derivedFrom chains.
fn resolve_peripheral(
    raw: &[RawPeripheral],
    by_name: &BTreeMap<&str, usize>,
    index: usize,
    stack: &mut Vec<String>,
) -> Result<(Option<String>, Vec<Register>)> {
    let p = &raw[index];
    if stack.contains(&p.name) {
        bail!("Circular derivedFrom chain: {} -> {}", stack.join(" -> "), p.name);
    }
    stack.push(p.name.clone());

    let registers = extract_svd_registers(p.info);
    let resolved = match p.info.derived_from.as_ref() {
        Some(parent) => {
            let parent_index = *by_name.get(parent.as_str())
                .ok_or_else(|| anyhow!("{} derives from unknown peripheral {}", p.name, parent))?;
            let (parent_group, parent_registers) = resolve_peripheral(raw, by_name, parent_index, stack)?;
            // A parent without groupName is grouped under its own name
            let parent_group = parent_group.unwrap_or_else(|| raw[parent_index].name.clone());
            let registers = if registers.is_empty() { parent_registers } else { registers };
            (Some(p.info.group_name.clone().unwrap_or(parent_group)), registers)
        }
        None => (p.info.group_name.clone(), registers),
    };

    stack.pop();
    Ok(resolved)
}

fn expand_dim_name(name: &str, index: &str) -> String {
    if name.contains("%s") {
        name.replace("[%s]", index).replace("%s", index)
    } else {
        format!("{}{}", name, index)
    }
}

fn map_access(access: Option<svd::Access>) -> Option<Access> {
    access.map(|access| match access {
        svd::Access::ReadOnly => Access::ReadOnly,
        svd::Access::WriteOnly | svd::Access::WriteOnce => Access::WriteOnly,
        svd::Access::ReadWrite | svd::Access::ReadWriteOnce => Access::ReadWrite,
    })
}

fn convert_register(reg: &RegisterInfo) -> Register {
    let register_access = reg.properties.access;

    let fields = reg.fields.iter().flatten().flat_map(|f| {
        let to_field = |name: String, bit_offset: u32| Field {
            is_reserved: Field::is_reserved_name(&name),
            name,
            description: f.description.clone().unwrap_or_default(),
            bit_width: f.bit_range.width,
            bit_offset,
            access: map_access(f.access.or(register_access)),
        };

        match f {
            MaybeArray::Single(f) => vec![to_field(f.name.clone(), f.bit_range.offset)],
            MaybeArray::Array(f, dim) => {
                dim.indexes().enumerate()
                    .map(|(i, index)| to_field(
                        expand_dim_name(&f.name, &index),
                        f.bit_range.offset + i as u32 * dim.dim_increment,
                    ))
                    .collect()
            }
        }
    })
    .collect();

    Register {
        name: reg.name.clone(),
        description: reg.description.clone().unwrap_or_default(),
        address_offset: reg.address_offset,
        fields,
    }
}

/// Flattens register arrays and clusters into plain registers, in declaration order.
pub fn extract_svd_registers(p: &PeripheralInfo) -> Vec<Register> {
    fn collect_register(reg: &RegisterInfo, in_array: Option<(u32, String)>, cluster: Option<(u32, &str)>) -> Register {
        let mut reg = convert_register(reg);

        if let Some((array_address, name)) = in_array {
            reg.address_offset = array_address;
            reg.name = name;
        }

        if let Some((cluster_offset, cluster_suffix)) = cluster {
            reg.address_offset += cluster_offset;
            reg.name.push_str(cluster_suffix);
        }
        reg
    }

    fn collect_registers<'a>(regs: impl IntoIterator<Item=&'a MaybeArray<RegisterInfo>>, cluster: Option<(u32, &str)>) -> Vec<Register> {
        regs.into_iter().flat_map(|r| {
            match r {
                MaybeArray::Single(r) => {
                    vec![collect_register(r, None, cluster)].into_iter()
                }
                MaybeArray::Array(r, dim) => {
                    let offsets = svd::register::address_offsets(r, dim);
                    let names = svd::array::names(r, dim);
                    offsets.zip(names)
                        .map(|in_array| collect_register(r, Some(in_array), cluster))
                        .collect::<Vec<_>>()
                        .into_iter()
                }
            }
        })
        .collect()
    }

    let mut all_regs = collect_registers(p.registers(), None);

    for cluster in p.clusters() {
        match cluster {
            MaybeArray::Single(c) => {
                let suffix = format!("_{}", c.name);
                all_regs.append(&mut collect_registers(c.all_registers(), Some((c.address_offset, suffix.as_str()))));
            }
            MaybeArray::Array(c, dim) => {
                let offsets = svd::cluster::address_offsets(c, dim);
                let indexes = dim.indexes();

                for (offset, index) in offsets.zip(indexes) {
                    all_regs.append(&mut collect_registers(c.all_registers(), Some((offset, &*index))));
                }
            }
        }
    }

    all_regs
}
