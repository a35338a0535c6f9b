// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

use super::grouping::GroupedField;
use crate::device::Access;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Single writable bit
    Binary,
    /// Read-only bits, whatever the width
    StatusBit,
    /// Multi-bit writable value
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    U8,
    U16,
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// Read-write, left implicit in the declaration
    Default,
    ReadOnly,
    WriteOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: Kind,
    pub storage: Storage,
    pub qualifier: Qualifier,
}

impl Storage {
    pub fn for_width(bit_width: u32) -> Self {
        match bit_width {
            0..=8 => Storage::U8,
            9..=16 => Storage::U16,
            _ => Storage::U32,
        }
    }

    pub fn cpp_type(self) -> &'static str {
        match self {
            Storage::U8 => "std::uint8_t",
            Storage::U16 => "std::uint16_t",
            Storage::U32 => "std::uint32_t",
        }
    }
}

impl Qualifier {
    pub fn from_access(access: Option<Access>) -> Self {
        match access {
            None | Some(Access::ReadWrite) => Qualifier::Default,
            Some(Access::ReadOnly) => Qualifier::ReadOnly,
            Some(Access::WriteOnly) => Qualifier::WriteOnly,
        }
    }

    pub fn cpp_name(self) -> &'static str {
        match self {
            Qualifier::Default => "BitMod::RdWr",
            Qualifier::ReadOnly => "BitMod::RdOnly",
            Qualifier::WriteOnly => "BitMod::WrOnly",
        }
    }
}

pub fn classify(bit_width: u32, access: Option<Access>) -> Classification {
    let kind = if access == Some(Access::ReadOnly) {
        Kind::StatusBit
    } else if bit_width == 1 {
        Kind::Binary
    } else {
        Kind::Value
    };

    Classification {
        kind,
        storage: Storage::for_width(bit_width),
        qualifier: Qualifier::from_access(access),
    }
}

/// One entry of a register's bit list, carrying just what its declaration needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitAccessor {
    Binary { bit_offset: u32, qualifier: Qualifier },
    StatusBit { bit_offset: u32, bit_width: u32, storage: Storage },
    Value { bit_offset: u32, bit_width: u32, storage: Storage, qualifier: Qualifier },
}

impl BitAccessor {
    pub fn new(bit_width: u32, bit_offset: u32, access: Option<Access>) -> Self {
        let Classification { kind, storage, qualifier } = classify(bit_width, access);
        match kind {
            Kind::Binary => BitAccessor::Binary { bit_offset, qualifier },
            Kind::StatusBit => BitAccessor::StatusBit { bit_offset, bit_width, storage },
            Kind::Value => BitAccessor::Value { bit_offset, bit_width, storage, qualifier },
        }
    }

    pub fn render(&self) -> String {
        let mut params = vec![];

        let (type_name, bit_offset) = match *self {
            BitAccessor::Binary { bit_offset, qualifier } => {
                if qualifier != Qualifier::Default {
                    params.push(qualifier.cpp_name().to_string());
                }
                ("Binary", bit_offset)
            }
            BitAccessor::StatusBit { bit_offset, bit_width, storage } => {
                params.push(bit_width.to_string());
                if storage != Storage::U8 {
                    params.push(storage.cpp_type().to_string());
                }
                ("StatusBit", bit_offset)
            }
            BitAccessor::Value { bit_offset, bit_width, storage, qualifier } => {
                params.push(bit_width.to_string());
                if storage != Storage::U8 {
                    params.push(storage.cpp_type().to_string());
                }
                if qualifier != Qualifier::Default {
                    params.push(qualifier.cpp_name().to_string());
                }
                ("Bit", bit_offset)
            }
        };

        format!("{}<{}>{{BitPos_t{{{}}}}}", type_name, params.join(", "), bit_offset)
    }
}

impl From<&GroupedField> for BitAccessor {
    fn from(f: &GroupedField) -> Self {
        Self::new(f.bit_width, f.bit_offset, f.access)
    }
}

impl fmt::Display for BitAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_wins_over_width() {
        let c = classify(1, Some(Access::ReadOnly));
        assert_eq!(c.kind, Kind::StatusBit);
        assert_eq!(c.qualifier, Qualifier::ReadOnly);
    }

    #[test]
    fn single_read_write_bit_is_binary() {
        let c = classify(1, Some(Access::ReadWrite));
        assert_eq!(c, Classification { kind: Kind::Binary, storage: Storage::U8, qualifier: Qualifier::Default });
    }

    #[test]
    fn nine_bits_need_sixteen_bit_storage() {
        let c = classify(9, None);
        assert_eq!(c, Classification { kind: Kind::Value, storage: Storage::U16, qualifier: Qualifier::Default });
    }

    #[test]
    fn storage_boundaries() {
        assert_eq!(Storage::for_width(8), Storage::U8);
        assert_eq!(Storage::for_width(16), Storage::U16);
        assert_eq!(Storage::for_width(17), Storage::U32);
        assert_eq!(Storage::for_width(32), Storage::U32);
    }

    #[test]
    fn render_binary() {
        assert_eq!(BitAccessor::new(1, 7, None).render(), "Binary<>{BitPos_t{7}}");
        assert_eq!(BitAccessor::new(1, 0, Some(Access::WriteOnly)).render(), "Binary<BitMod::WrOnly>{BitPos_t{0}}");
    }

    #[test]
    fn render_status_bit() {
        assert_eq!(BitAccessor::new(1, 5, Some(Access::ReadOnly)).render(), "StatusBit<1>{BitPos_t{5}}");
        assert_eq!(BitAccessor::new(12, 0, Some(Access::ReadOnly)).render(), "StatusBit<12, std::uint16_t>{BitPos_t{0}}");
    }

    #[test]
    fn render_value() {
        assert_eq!(BitAccessor::new(2, 3, None).render(), "Bit<2>{BitPos_t{3}}");
        assert_eq!(BitAccessor::new(32, 0, Some(Access::ReadWrite)).render(), "Bit<32, std::uint32_t>{BitPos_t{0}}");
        assert_eq!(BitAccessor::new(4, 8, Some(Access::WriteOnly)).render(), "Bit<4, BitMod::WrOnly>{BitPos_t{8}}");
        assert_eq!(BitAccessor::new(10, 0, Some(Access::WriteOnly)).render(),
            "Bit<10, std::uint16_t, BitMod::WrOnly>{BitPos_t{0}}");
    }
}
