// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeSet;

use crate::device::{Access, Field};

/// A field after per-bit siblings sharing one description have been merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedField {
    pub name: String,
    pub description: String,
    pub bit_width: u32,
    pub bit_offset: u32,
    pub access: Option<Access>,
    pub is_reserved: bool,
}

impl From<&Field> for GroupedField {
    fn from(f: &Field) -> Self {
        Self {
            name: f.name.clone(),
            description: f.description.clone(),
            bit_width: f.bit_width,
            bit_offset: f.bit_offset,
            access: f.access,
            is_reserved: f.is_reserved,
        }
    }
}

/// Merges fields sharing a description into one field whose width is the
/// repeat count, e.g. `PUPDR15..PUPDR0` becomes `PUPDR`.
///
/// Fields are scanned last to first and the output keeps that discovery
/// order. Vendors list fields from the highest bit down, so the result
/// usually reads from bit 0 upwards.
pub fn group_by_description(fields: &[Field]) -> Vec<GroupedField> {
    let mut seen = BTreeSet::new();
    let mut grouped = vec![];

    for field in fields.iter().rev() {
        if !seen.insert(field.description.as_str()) {
            continue;
        }

        let siblings = fields.iter()
            .filter(|f| f.description == field.description)
            .collect::<Vec<_>>();

        let mut new_field = GroupedField::from(field);
        if siblings.len() > 1 {
            new_field.bit_width = siblings.len() as u32;
            new_field.bit_offset = siblings.iter().map(|f| f.bit_offset).min().unwrap_or(field.bit_offset);
            // drop the per-bit index, unless nothing would be left
            if new_field.name.chars().count() > 1 {
                new_field.name.pop();
            }
        }
        grouped.push(new_field);
    }

    grouped
}
