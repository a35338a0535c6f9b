// SPDX-License-Identifier: GPL-3.0-or-later

pub mod accessor;
pub mod address;
pub mod grouping;

use std::fmt::Write as _;
use anyhow::Result;

use crate::config::OutputConfig;
use crate::device::{Peripheral, Register};
use crate::util::{normalize_whitespace, sanitize_ident};
use accessor::BitAccessor;
use address::{BaseAddress, PeripheralGroup};
use grouping::group_by_description;

const BIT_LIST_INDENT: &str = "\t\t\t\t\t";

/// Renders one header per peripheral group.
pub struct Emitter<'a> {
    config: &'a OutputConfig,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a OutputConfig) -> Self {
        Self { config }
    }

    pub fn file_name(&self, group: &PeripheralGroup) -> String {
        format!("{}.{}", sanitize_ident(&group.name).to_lowercase(), self.config.extension)
    }

    pub fn namespace(&self, group: &PeripheralGroup) -> String {
        let group_ns = sanitize_ident(&group.name).to_lowercase();
        if self.config.namespace.is_empty() {
            format!("{}::reg", group_ns)
        } else {
            format!("{}::{}::reg", self.config.namespace, group_ns)
        }
    }

    fn is_pin_indexed(&self, group: &PeripheralGroup) -> bool {
        self.config.pin_indexed_groups.iter()
            .any(|g| g.eq_ignore_ascii_case(&group.name))
    }

    pub fn render(&self, group: &PeripheralGroup) -> Result<String> {
        let mut out = String::new();
        let namespace = self.namespace(group);
        let base = group.base_address();
        let layout = group.layout();

        out.push_str("#pragma once\n\n");
        for include in &self.config.includes {
            writeln!(out, "#include \"{}\"", include)?;
        }

        write!(out, "\nnamespace {} {{\n\n", namespace)?;
        out.push_str(&base.declaration()?);

        for reg in &layout.registers {
            self.render_register(&mut out, layout, reg, &base, self.is_pin_indexed(group))?;
        }

        write!(out, "\n}} // {}\n", namespace)?;
        Ok(out)
    }

    fn render_register(
        &self,
        out: &mut String,
        peripheral: &Peripheral,
        reg: &Register,
        base: &BaseAddress,
        pin_indexed: bool,
    ) -> Result<()> {
        let reg_name = sanitize_ident(&reg.name);
        let grouped = group_by_description(&reg.fields);

        write!(out, "/**\n * @defgroup\t{}_{}_GROUP\t\t{} group\n *\n * @{{\n */\n\n",
            sanitize_ident(&peripheral.name), reg_name, normalize_whitespace(&reg.description))?;

        let accessors = grouped.iter()
            .filter(|f| !f.is_reserved)
            .collect::<Vec<_>>();

        write!(out, "SETUP_REGISTER_INFO({}BitList, /**/\n", reg_name)?;
        for (i, field) in accessors.iter().enumerate() {
            let separator = if i + 1 < accessors.len() { "," } else { "" };
            writeln!(out, "{}{}{}\t// {}", BIT_LIST_INDENT, BitAccessor::from(*field), separator, field.name)?;
        }
        write!(out, "{})\n\n", BIT_LIST_INDENT)?;

        let index = if pin_indexed {
            "Pin".to_string()
        } else {
            let index = format!("{}Field", reg_name);
            writeln!(out, "enum class {} {{", index)?;
            for field in &grouped {
                writeln!(out, "\t{},\t\t/*!< {}*/", sanitize_ident(&field.name), normalize_whitespace(&field.description))?;
            }
            out.push_str("};\n\n");
            index
        };

        if let Some(template) = base.template_header() {
            out.push_str(&template);
        }
        write!(out, "static constexpr Register<{}BitList, {}> {}{{{}, 0x{:02x}U}};",
            reg_name, index, reg_name, base.expression(), reg.address_offset)?;
        out.push_str("\n/**@}*/\n\n");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::address::group_peripherals;
    use crate::device::{Access, Field};
    use crate::device::tests::{field, peripheral, register};

    fn render_one(peripherals: &[Peripheral]) -> String {
        let config = OutputConfig::default();
        let groups = group_peripherals(peripherals);
        Emitter::new(&config).render(&groups[0]).unwrap()
    }

    fn crc() -> Vec<Peripheral> {
        let mut reset = field("RESET", "RESET bit", 0, 1);
        reset.access = Some(Access::WriteOnly);

        vec![peripheral("CRC", "CRC", 0x4002_3000, vec![
            register("CR", 0x08, vec![
                field("REV_OUT", "Reverse output data", 7, 1),
                field("REV_IN", "Reverse input\n          data", 5, 2),
                field("POLYSIZE", "Polynomial size", 3, 2),
                reset,
            ]),
        ])]
    }

    #[test]
    fn renders_single_instance_header() {
        let text = render_one(&crc());

        let expected = "#pragma once\n\
            \n\
            #include \"cpp_stm32/hal/bit.hxx\"\n\
            #include \"cpp_stm32/hal/register.hxx\"\n\
            \n\
            namespace cpp_stm32::crc::reg {\n\
            \n\
            static constexpr auto BASE_ADDR = 0x40023000U;\n\
            \n\
            /**\n \
            * @defgroup\tCRC_CR_GROUP\t\tCR register group\n \
            *\n \
            * @{\n \
            */\n\
            \n\
            SETUP_REGISTER_INFO(CRBitList, /**/\n\
            \t\t\t\t\tBinary<BitMod::WrOnly>{BitPos_t{0}},\t// RESET\n\
            \t\t\t\t\tBit<2>{BitPos_t{3}},\t// POLYSIZE\n\
            \t\t\t\t\tBit<2>{BitPos_t{5}},\t// REV_IN\n\
            \t\t\t\t\tBinary<>{BitPos_t{7}}\t// REV_OUT\n\
            \t\t\t\t\t)\n\
            \n\
            enum class CRField {\n\
            \tRESET,\t\t/*!< RESET bit*/\n\
            \tPOLYSIZE,\t\t/*!< Polynomial size*/\n\
            \tREV_IN,\t\t/*!< Reverse input data*/\n\
            \tREV_OUT,\t\t/*!< Reverse output data*/\n\
            };\n\
            \n\
            static constexpr Register<CRBitList, CRField> CR{BASE_ADDR, 0x08U};\n\
            /**@}*/\n\
            \n\
            \n\
            } // cpp_stm32::crc::reg\n";

        assert_eq!(text, expected);
    }

    #[test]
    fn multi_instance_registers_use_dispatch() {
        let regs = || vec![
            register("SR", 0x00, vec![field("TXE", "Transmit data register empty", 7, 1)]),
            register("DR", 0x04, vec![field("DR", "Data value", 0, 9)]),
        ];
        let peripherals = vec![
            peripheral("USART1", "USART", 0x4001_1000, regs()),
            peripheral("USART2", "USART", 0x4000_4400, regs()),
        ];

        let text = render_one(&peripherals);

        assert!(text.contains("static constexpr auto BASE_ADDR(Port const& t_usart) {"));
        assert!(text.contains("\tcase Port::USART1:\n\t\treturn 0x40011000U;\n"));
        assert!(text.contains("\tcase Port::USART2:\n\t\treturn 0x40004400U;\n"));
        assert!(text.contains("template <Port USART>\nstatic constexpr Register<SRBitList, SRField> SR{BASE_ADDR(USART), 0x00U};"));
        assert!(text.contains("template <Port USART>\nstatic constexpr Register<DRBitList, DRField> DR{BASE_ADDR(USART), 0x04U};"));
        assert!(!text.contains("{BASE_ADDR, "));
        assert!(text.contains("Bit<9, std::uint16_t>{BitPos_t{0}}\t// DR"));
        assert!(text.contains("@defgroup\tUSART1_SR_GROUP"));
    }

    #[test]
    fn gpio_groups_bits_and_uses_pin_index() {
        let fields = (0..16).rev()
            .map(|i| field(&format!("MODER{}", i), "GPIO port mode bits", i * 2, 2))
            .collect::<Vec<_>>();
        let peripherals = vec![peripheral("GPIOA", "GPIO", 0x4002_0000, vec![register("MODER", 0x00, fields)])];

        let text = render_one(&peripherals);

        assert_eq!(text.matches("// MODER").count(), 1);
        assert!(text.contains("\t\t\t\t\tBit<16, std::uint16_t>{BitPos_t{0}}\t// MODER\n"));
        assert!(text.contains("static constexpr Register<MODERBitList, Pin> MODER{BASE_ADDR, 0x00U};"));
        assert!(!text.contains("enum class"));
    }

    #[test]
    fn reserved_fields_are_listed_but_not_accessed() {
        let peripherals = vec![peripheral("PWR", "PWR", 0x4000_7000, vec![
            register("CSR", 0x04, vec![
                field("RESERVED", "Reserved", 1, 7),
                field("WUF", "Wakeup flag", 0, 1),
            ]),
        ])];

        let text = render_one(&peripherals);

        assert!(text.contains("SETUP_REGISTER_INFO(CSRBitList, /**/\n\t\t\t\t\tBinary<>{BitPos_t{0}}\t// WUF\n\t\t\t\t\t)\n"));
        assert!(text.contains("\tRESERVED,\t\t/*!< Reserved*/\n"));
    }

    #[test]
    fn single_character_fields_keep_their_name() {
        let peripherals = vec![peripheral("ADC", "ADC", 0x4001_2000, vec![
            register("SQR", 0x2c, vec![
                field("B", "Channel select", 1, 1),
                field("A", "Channel select", 0, 1),
            ]),
        ])];
        let text = render_one(&peripherals);

        assert!(text.contains("\t\t\t\t\tBit<2>{BitPos_t{0}}\t// A\n"));
        assert!(text.contains("enum class SQRField {\n\tA,\t\t/*!< Channel select*/\n};\n"));
        assert!(!text.contains("\t,"));
    }

    #[test]
    fn empty_register() {
        let peripherals = vec![peripheral("DBG", "DBG", 0xE004_2000, vec![register("IDCODE", 0x00, vec![])])];
        let text = render_one(&peripherals);

        assert!(text.contains("SETUP_REGISTER_INFO(IDCODEBitList, /**/\n\t\t\t\t\t)\n\nenum class IDCODEField {\n};\n"));
    }

    #[test]
    fn configurable_namespace_and_includes() {
        let config = OutputConfig {
            namespace: String::new(),
            includes: vec!["hal/regs.hpp".to_string()],
            extension: "hpp".to_string(),
            ..OutputConfig::default()
        };
        let peripherals = crc();
        let groups = group_peripherals(&peripherals);
        let emitter = Emitter::new(&config);
        let text = emitter.render(&groups[0]).unwrap();

        assert_eq!(emitter.file_name(&groups[0]), "crc.hpp");
        assert!(text.starts_with("#pragma once\n\n#include \"hal/regs.hpp\"\n\nnamespace crc::reg {\n"));
        assert!(text.ends_with("} // crc::reg\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let peripherals = crc();
        let first = render_one(&peripherals);
        let second = render_one(&peripherals);
        assert_eq!(first, second);
        // grouping never touches the model
        assert_eq!(peripherals[0].registers[0].fields.iter().map(|f: &Field| f.bit_width).sum::<u32>(), 6);
    }
}
