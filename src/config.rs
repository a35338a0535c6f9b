// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root namespace, the group namespace is nested under it
    pub namespace: String,
    pub includes: Vec<String>,
    pub extension: String,
    /// Groups indexed by the fixed `Pin` type instead of a generated enum
    pub pin_indexed_groups: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            namespace: "cpp_stm32".to_string(),
            includes: vec![
                "cpp_stm32/hal/bit.hxx".to_string(),
                "cpp_stm32/hal/register.hxx".to_string(),
            ],
            extension: "hxx".to_string(),
            pin_indexed_groups: vec!["GPIO".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            command: "clang-format".to_string(),
            args: vec!["-i".to_string(), "--style=file".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Holds `<vendor>/<target>.svd`
    pub svd_dir: String,
    pub output: OutputConfig,
    pub formatter: FormatterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            svd_dir: "data".to_string(),
            output: Default::default(),
            formatter: Default::default(),
        }
    }
}
