//! Built-in example networks.
//!
//! - Rain: one cause, one effect (Chuva → GramaMolhada)
//! - Medical: a rare disease with two symptoms and a diagnostic test
//! - Weather: three-valued root feeding two intermediates and a joint child

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::network::{NetworkSpec, NodeSpec, RowSpec, TableSpec};

/// Available presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Rain makes the grass wet
    Rain,
    /// Disease diagnosis from symptoms and a test
    Medical,
    /// Whether to play tennis given the weather
    Weather,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] =
        &[PresetName::Rain, PresetName::Medical, PresetName::Weather];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Rain => "rain",
            PresetName::Medical => "medical",
            PresetName::Weather => "weather",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "rain" | "chuva" | "sprinkler" => Some(PresetName::Rain),
            "medical" | "diagnosis" | "doenca" => Some(PresetName::Medical),
            "weather" | "tennis" | "tempo" => Some(PresetName::Weather),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Rain => "Two nodes: rain (Chuva) causes wet grass (GramaMolhada)",
            PresetName::Medical => {
                "Rare disease (Doenca) with two symptoms and a diagnostic test (Teste)"
            }
            PresetName::Weather => {
                "Weather (Tempo) drives humidity and wind; all three decide JogarTenis"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Get the network for a preset.
pub fn get_preset(name: PresetName) -> NetworkSpec {
    match name {
        PresetName::Rain => rain_preset(),
        PresetName::Medical => medical_preset(),
        PresetName::Weather => weather_preset(),
    }
}

const SIM_NAO: [&str; 2] = ["sim", "não"];

fn domain(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn dist(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(v, p)| (v.to_string(), *p)).collect()
}

fn root(name: &str, pairs: &[(&str, f64)]) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        domain: domain(&pairs.iter().map(|(v, _)| *v).collect::<Vec<_>>()),
        parents: Vec::new(),
        table: TableSpec::Marginal(dist(pairs)),
    }
}

fn row(given: &[&str], pairs: &[(&str, f64)]) -> RowSpec {
    RowSpec {
        given: domain(given),
        probabilities: dist(pairs),
    }
}

fn child(name: &str, values: &[&str], parents: &[&str], rows: Vec<RowSpec>) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        domain: domain(values),
        parents: domain(parents),
        table: TableSpec::Conditional(rows),
    }
}

fn network(name: PresetName, nodes: Vec<NodeSpec>) -> NetworkSpec {
    NetworkSpec {
        schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
        name: name.as_str().to_string(),
        description: Some(name.description().to_string()),
        nodes,
    }
}

/// Rain preset.
///
/// - P(Chuva = sim) = 0.2
/// - P(GramaMolhada = sim | Chuva = sim) = 0.9, and 0.1 without rain
fn rain_preset() -> NetworkSpec {
    network(
        PresetName::Rain,
        vec![
            root("Chuva", &[("sim", 0.2), ("não", 0.8)]),
            child(
                "GramaMolhada",
                &SIM_NAO,
                &["Chuva"],
                vec![
                    row(&["sim"], &[("sim", 0.9), ("não", 0.1)]),
                    row(&["não"], &[("sim", 0.1), ("não", 0.9)]),
                ],
            ),
        ],
    )
}

/// Medical preset: 1% prevalence, symptoms and test conditionally
/// independent given the disease.
fn medical_preset() -> NetworkSpec {
    network(
        PresetName::Medical,
        vec![
            root("Doenca", &[("sim", 0.01), ("não", 0.99)]),
            child(
                "Sintoma1",
                &SIM_NAO,
                &["Doenca"],
                vec![
                    row(&["sim"], &[("sim", 0.8), ("não", 0.2)]),
                    row(&["não"], &[("sim", 0.1), ("não", 0.9)]),
                ],
            ),
            child(
                "Sintoma2",
                &SIM_NAO,
                &["Doenca"],
                vec![
                    row(&["sim"], &[("sim", 0.6), ("não", 0.4)]),
                    row(&["não"], &[("sim", 0.05), ("não", 0.95)]),
                ],
            ),
            child(
                "Teste",
                &["positivo", "negativo"],
                &["Doenca"],
                vec![
                    row(&["sim"], &[("positivo", 0.95), ("negativo", 0.05)]),
                    row(&["não"], &[("positivo", 0.02), ("negativo", 0.98)]),
                ],
            ),
        ],
    )
}

/// Weather preset: JogarTenis depends on all three weather variables.
fn weather_preset() -> NetworkSpec {
    let tempo = ["ensolarado", "nublado", "chuvoso"];
    let umidade = ["alta", "normal"];
    let vento = ["forte", "fraco"];

    // P(JogarTenis = sim) per (Tempo, Umidade, Vento), Tempo slowest.
    let play = [
        0.3, 0.5, 0.7, 0.9, // ensolarado
        0.2, 0.4, 0.6, 0.8, // nublado
        0.1, 0.2, 0.3, 0.4, // chuvoso
    ];

    let mut rows = Vec::with_capacity(play.len());
    let mut i = 0;
    for t in tempo {
        for u in umidade {
            for v in vento {
                let p = play[i];
                rows.push(row(&[t, u, v], &[("sim", p), ("não", 1.0 - p)]));
                i += 1;
            }
        }
    }

    network(
        PresetName::Weather,
        vec![
            root(
                "Tempo",
                &[("ensolarado", 0.5), ("nublado", 0.3), ("chuvoso", 0.2)],
            ),
            child(
                "Umidade",
                &umidade,
                &["Tempo"],
                vec![
                    row(&["ensolarado"], &[("alta", 0.3), ("normal", 0.7)]),
                    row(&["nublado"], &[("alta", 0.4), ("normal", 0.6)]),
                    row(&["chuvoso"], &[("alta", 0.8), ("normal", 0.2)]),
                ],
            ),
            child(
                "Vento",
                &vento,
                &["Tempo"],
                vec![
                    row(&["ensolarado"], &[("forte", 0.2), ("fraco", 0.8)]),
                    row(&["nublado"], &[("forte", 0.3), ("fraco", 0.7)]),
                    row(&["chuvoso"], &[("forte", 0.6), ("fraco", 0.4)]),
                ],
            ),
            NodeSpec {
                name: "JogarTenis".to_string(),
                domain: domain(&SIM_NAO),
                parents: domain(&["Tempo", "Umidade", "Vento"]),
                table: TableSpec::Conditional(rows),
            },
        ],
    )
}

/// Information about a preset for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub nodes: Vec<String>,
    pub edge_count: usize,
}

impl PresetInfo {
    /// Create info from a preset.
    pub fn from_preset(name: PresetName) -> Self {
        let spec = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            edge_count: spec.edge_count(),
            nodes: spec.nodes.into_iter().map(|n| n.name).collect(),
        }
    }
}

/// List all available presets with summary information.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_network_spec;

    #[test]
    fn preset_name_parsing() {
        assert_eq!(PresetName::parse("rain"), Some(PresetName::Rain));
        assert_eq!(PresetName::parse("Chuva"), Some(PresetName::Rain));
        assert_eq!(PresetName::parse("medical"), Some(PresetName::Medical));
        assert_eq!(PresetName::parse("tennis"), Some(PresetName::Weather));
        assert_eq!(PresetName::parse("unknown"), None);
        assert!("nope".parse::<PresetName>().is_err());
    }

    #[test]
    fn preset_name_display() {
        for name in PresetName::ALL {
            assert_eq!(name.to_string(), name.as_str());
            assert_eq!(PresetName::parse(name.as_str()), Some(*name));
        }
    }

    #[test]
    fn every_preset_validates() {
        for name in PresetName::ALL {
            let spec = get_preset(*name);
            validate_network_spec(&spec)
                .unwrap_or_else(|e| panic!("preset {} invalid: {}", name, e));
        }
    }

    #[test]
    fn weather_table_has_all_twelve_rows() {
        let spec = get_preset(PresetName::Weather);
        let node = spec.node("JogarTenis").unwrap();
        match &node.table {
            TableSpec::Conditional(rows) => {
                assert_eq!(rows.len(), 12);
                let first = &rows[0];
                assert_eq!(first.given, vec!["ensolarado", "alta", "forte"]);
                assert!((first.probabilities["sim"] - 0.3).abs() < 1e-12);
                let last = &rows[11];
                assert_eq!(last.given, vec!["chuvoso", "normal", "fraco"]);
                assert!((last.probabilities["não"] - 0.6).abs() < 1e-12);
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn list_presets_reports_structure() {
        let presets = list_presets();
        assert_eq!(presets.len(), 3);
        let medical = presets.iter().find(|p| p.name == "medical").unwrap();
        assert_eq!(medical.nodes, vec!["Doenca", "Sintoma1", "Sintoma2", "Teste"]);
        assert_eq!(medical.edge_count, 3);
    }

    #[test]
    fn preset_error_display_lists_available() {
        let err = PresetError::UnknownPreset("fog".to_string());
        let msg = err.to_string();
        assert!(msg.contains("fog"));
        assert!(msg.contains("rain, medical, weather"));
    }
}
