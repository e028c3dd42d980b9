use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub detour: DetourConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeightsConfig {
    #[serde(default = "default_weight_wirelength")]
    pub wirelength: f64,
    #[serde(default = "default_weight_detour")]
    pub detour: f64,
    #[serde(default = "default_weight_overflow")]
    pub overflow: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            wirelength: default_weight_wirelength(),
            detour: default_weight_detour(),
            overflow: default_weight_overflow(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetourFunction {
    Exp,
    PartialLinear,
}

impl FromStr for DetourFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exp" => Ok(DetourFunction::Exp),
            "partial_linear" => Ok(DetourFunction::PartialLinear),
            other => Err(format!(
                "unknown detour function '{}' (expected 'exp' or 'partial_linear')",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetourConfig {
    #[serde(default = "default_detour_function")]
    pub function: DetourFunction,
    /// Multiplier turning slack (seconds) into the weight function's argument.
    #[serde(default = "default_slack_scale")]
    pub slack_scale: f64,
}

impl Default for DetourConfig {
    fn default() -> Self {
        Self {
            function: default_detour_function(),
            slack_scale: default_slack_scale(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub fast_two_pin: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct InputConfig {
    #[serde(default)]
    pub netlist_file: Option<String>,
    #[serde(default)]
    pub resume_file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_steiner_file")]
    pub steiner_file: String,
    #[serde(default = "default_topology_file")]
    pub topology_file: String,
    #[serde(default = "default_final_topology_file")]
    pub final_topology_file: String,
    #[serde(default)]
    pub render: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            steiner_file: default_steiner_file(),
            topology_file: default_topology_file(),
            final_topology_file: default_final_topology_file(),
            render: false,
            log_level: default_log_level(),
        }
    }
}

fn default_weight_wirelength() -> f64 {
    0.1
}

fn default_weight_detour() -> f64 {
    0.9
}

fn default_weight_overflow() -> f64 {
    0.5
}

fn default_detour_function() -> DetourFunction {
    DetourFunction::Exp
}

fn default_slack_scale() -> f64 {
    1e11
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_steiner_file() -> String {
    "steiner.txt".to_string()
}

fn default_topology_file() -> String {
    "res.txt".to_string()
}

fn default_final_topology_file() -> String {
    "res_final.txt".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detour_function_from_str() {
        assert_eq!("exp".parse::<DetourFunction>(), Ok(DetourFunction::Exp));
        assert_eq!(
            "PARTIAL_LINEAR".parse::<DetourFunction>(),
            Ok(DetourFunction::PartialLinear)
        );
        assert!("cubic".parse::<DetourFunction>().is_err());
    }

    #[test]
    fn defaults_match_reference_weights() {
        let cfg = Config::default();
        assert_eq!(cfg.weights.wirelength, 0.1);
        assert_eq!(cfg.weights.detour, 0.9);
        assert_eq!(cfg.weights.overflow, 0.5);
        assert_eq!(cfg.detour.function, DetourFunction::Exp);
        assert_eq!(cfg.output.steiner_file, "steiner.txt");
        assert!(cfg.input.resume_file.is_none());
    }
}
