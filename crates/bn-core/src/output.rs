//! Payload rendering for CLI commands.
//!
//! Every renderer returns the text to print on stdout, or `None` for
//! [`OutputFormat::Exitcode`]. JSON payloads share one envelope:
//! `schema_version`, `generated_at`, `command`, and the `network` they were
//! computed from.

use bn_common::{Error, ErrorReport, OutputFormat, SCHEMA_VERSION};
use bn_config::{NetworkSnapshot, PresetInfo};
use serde_json::{json, Map, Value};

use crate::inference::{format_assignment, Posterior};
use crate::network::{Assignment, Network};

/// Width of the probability bars in Markdown tables.
const BAR_WIDTH: usize = 20;

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn network_ref(snapshot: &NetworkSnapshot) -> Value {
    json!({
        "name": snapshot.name,
        "source": snapshot.source,
        "path": snapshot.path,
        "content_hash": snapshot.content_hash,
    })
}

/// Wrap a command payload in the standard envelope.
pub fn envelope(command: &str, snapshot: Option<&NetworkSnapshot>, payload: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("schema_version".to_string(), json!(SCHEMA_VERSION));
    obj.insert(
        "generated_at".to_string(),
        json!(chrono::Utc::now().to_rfc3339()),
    );
    obj.insert("command".to_string(), json!(command));
    if let Some(snapshot) = snapshot {
        obj.insert("network".to_string(), network_ref(snapshot));
    }
    match payload {
        Value::Object(fields) => obj.extend(fields),
        Value::Null => {}
        other => {
            obj.insert("result".to_string(), other);
        }
    }
    Value::Object(obj)
}

/// `P(Q)` or `P(Q | A=a, B=b)`.
pub fn posterior_label(query: &str, evidence: &Assignment) -> String {
    if evidence.is_empty() {
        format!("P({})", query)
    } else {
        format!("P({} | {})", query, format_assignment(evidence))
    }
}

fn bar(p: f64) -> String {
    let filled = (p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

fn posterior_md(out: &mut String, posterior: &Posterior, heading: &str) {
    out.push_str(&format!(
        "{} {}\n\n",
        heading,
        posterior_label(&posterior.query, &posterior.evidence)
    ));
    out.push_str("| Value | Probability | |\n|---|---:|---|\n");
    for (value, p) in posterior {
        out.push_str(&format!("| {} | {:.4} | {} |\n", value, p, bar(p)));
    }
    out.push_str(&format!(
        "\nP(evidence) = {:.6}; {} hidden combinations per value.\n",
        posterior.evidence_probability, posterior.hidden_combinations
    ));
}

fn posterior_summary(posterior: &Posterior) -> String {
    let values = posterior
        .iter()
        .map(|(v, p)| format!("{}={:.4}", v, p))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}: {}",
        posterior_label(&posterior.query, &posterior.evidence),
        values
    )
}

fn posterior_json(posterior: &Posterior) -> Value {
    let mut value = serde_json::to_value(posterior).unwrap_or(Value::Null);
    if let Value::Object(obj) = &mut value {
        obj.insert(
            "most_likely".to_string(),
            json!(posterior.most_likely().map(|o| &o.value)),
        );
        obj.insert(
            "entropy_bits".to_string(),
            json!(posterior.entropy_bits()),
        );
    }
    value
}

/// Render the result of `infer`.
pub fn render_posterior(
    format: OutputFormat,
    posterior: &Posterior,
    snapshot: &NetworkSnapshot,
) -> Option<String> {
    match format {
        OutputFormat::Json => Some(pretty(&envelope(
            "infer",
            Some(snapshot),
            json!({ "posterior": posterior_json(posterior) }),
        ))),
        OutputFormat::Md => {
            let mut out = String::new();
            posterior_md(&mut out, posterior, "#");
            Some(out)
        }
        OutputFormat::Summary => Some(posterior_summary(posterior)),
        OutputFormat::Exitcode => None,
    }
}

/// Render the result of `marginals`.
pub fn render_marginals(
    format: OutputFormat,
    posteriors: &[Posterior],
    evidence: &Assignment,
    snapshot: &NetworkSnapshot,
) -> Option<String> {
    match format {
        OutputFormat::Json => Some(pretty(&envelope(
            "marginals",
            Some(snapshot),
            json!({
                "evidence": evidence,
                "marginals": posteriors.iter().map(posterior_json).collect::<Vec<_>>(),
            }),
        ))),
        OutputFormat::Md => {
            let mut out = format!("# Marginals of {}\n\n", snapshot.name);
            if !evidence.is_empty() {
                out.push_str(&format!("Evidence: {}\n\n", format_assignment(evidence)));
            }
            if posteriors.is_empty() {
                out.push_str("Every node is observed.\n");
            }
            for posterior in posteriors {
                posterior_md(&mut out, posterior, "##");
                out.push('\n');
            }
            Some(out)
        }
        OutputFormat::Summary => Some(
            posteriors
                .iter()
                .map(posterior_summary)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        OutputFormat::Exitcode => None,
    }
}

/// Render the result of `joint`.
///
/// A zero probability has no finite log; JSON reports it as `null`.
pub fn render_joint(
    format: OutputFormat,
    assignment: &Assignment,
    probability: f64,
    log_probability: f64,
    snapshot: &NetworkSnapshot,
) -> Option<String> {
    let label = format!("P({})", format_assignment(assignment));
    match format {
        OutputFormat::Json => Some(pretty(&envelope(
            "joint",
            Some(snapshot),
            json!({
                "assignment": assignment,
                "probability": probability,
                "log_probability": log_probability.is_finite().then_some(log_probability),
            }),
        ))),
        OutputFormat::Md => Some(format!(
            "# Joint probability\n\n{} = {:.6}\n\nln P = {:.6}\n",
            label, probability, log_probability
        )),
        OutputFormat::Summary => Some(format!("{} = {:.6}", label, probability)),
        OutputFormat::Exitcode => None,
    }
}

/// Render the `describe` command: nodes, domains, parents, children, edges.
pub fn render_describe(
    format: OutputFormat,
    network: &Network,
    description: Option<&str>,
    snapshot: &NetworkSnapshot,
) -> Option<String> {
    match format {
        OutputFormat::Json => {
            let nodes: Vec<Value> = network
                .nodes()
                .map(|n| {
                    json!({
                        "name": n.name,
                        "domain": n.domain,
                        "parents": n.parents,
                        "children": n.children,
                        "table_rows": network.cpt(&n.name).map(|c| c.row_count()),
                    })
                })
                .collect();
            let edges: Vec<Value> = network
                .edges()
                .into_iter()
                .map(|(from, to)| json!({ "from": from, "to": to }))
                .collect();
            Some(pretty(&envelope(
                "describe",
                Some(snapshot),
                json!({
                    "description": description,
                    "nodes": nodes,
                    "edges": edges,
                }),
            )))
        }
        OutputFormat::Md => {
            let mut out = format!("# Network {}\n\n", snapshot.name);
            if let Some(d) = description {
                out.push_str(d);
                out.push_str("\n\n");
            }
            out.push_str("| Node | Domain | Parents | Children |\n|---|---|---|---|\n");
            for n in network.nodes() {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    n.name,
                    n.domain.join(", "),
                    n.parents.join(", "),
                    n.children.join(", ")
                ));
            }
            Some(out)
        }
        OutputFormat::Summary => Some(format!(
            "{}: {} nodes, {} edges ({})",
            snapshot.name,
            network.len(),
            network.edges().len(),
            network.node_names().join(", ")
        )),
        OutputFormat::Exitcode => None,
    }
}

/// Render a successful `check`.
pub fn render_check(
    format: OutputFormat,
    network: &Network,
    snapshot: &NetworkSnapshot,
) -> Option<String> {
    let rows: usize = network
        .node_names()
        .iter()
        .filter_map(|n| network.cpt(n))
        .map(|c| c.row_count())
        .sum();
    match format {
        OutputFormat::Json => Some(pretty(&envelope(
            "check",
            Some(snapshot),
            json!({
                "status": "ok",
                "nodes": snapshot.node_count,
                "edges": snapshot.edge_count,
                "table_rows": rows,
                "source": snapshot.source,
            }),
        ))),
        OutputFormat::Md => Some(format!(
            "# Check: {}\n\n- status: ok\n- nodes: {}\n- edges: {}\n- table rows: {}\n- source: {}\n- hash: {}\n",
            snapshot.name,
            snapshot.node_count,
            snapshot.edge_count,
            rows,
            snapshot.source,
            snapshot.short_hash()
        )),
        OutputFormat::Summary => Some(format!(
            "ok: {} ({} nodes, {} edges, {} table rows)",
            snapshot.name, snapshot.node_count, snapshot.edge_count, rows
        )),
        OutputFormat::Exitcode => None,
    }
}

/// Render the `presets` listing.
pub fn render_presets(format: OutputFormat, presets: &[PresetInfo]) -> Option<String> {
    match format {
        OutputFormat::Json => Some(pretty(&envelope(
            "presets",
            None,
            json!({ "presets": presets }),
        ))),
        OutputFormat::Md => {
            let mut out = String::from("# Presets\n\n| Name | Nodes | Edges | Description |\n|---|---|---:|---|\n");
            for p in presets {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    p.name,
                    p.nodes.join(", "),
                    p.edge_count,
                    p.description
                ));
            }
            Some(out)
        }
        OutputFormat::Summary => Some(
            presets
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        OutputFormat::Exitcode => None,
    }
}

/// Render an error for stdout (JSON) or stderr (everything else).
///
/// JSON callers get an [`ErrorReport`]; humans get the headline, reason,
/// and fix lines.
pub fn render_error(format: OutputFormat, err: &Error, use_color: bool) -> String {
    match format {
        OutputFormat::Json => {
            let report = ErrorReport::from(err);
            pretty(&json!({
                "schema_version": SCHEMA_VERSION,
                "error": report,
            }))
        }
        _ => bn_common::error::format_error_human(err, use_color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer;
    use bn_config::{get_preset, ConfigSource, PresetName};

    fn rain() -> (Network, NetworkSnapshot) {
        let spec = get_preset(PresetName::Rain);
        let snapshot = NetworkSnapshot::new(&spec, ConfigSource::Preset, None);
        (Network::from_spec(&spec).unwrap(), snapshot)
    }

    fn evidence(pairs: &[(&str, &str)]) -> Assignment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn label_includes_evidence() {
        assert_eq!(posterior_label("A", &Assignment::new()), "P(A)");
        assert_eq!(
            posterior_label("A", &evidence(&[("B", "sim")])),
            "P(A | B=sim)"
        );
    }

    #[test]
    fn posterior_json_has_envelope() {
        let (net, snapshot) = rain();
        let post = infer(&net, "Chuva", &evidence(&[("GramaMolhada", "sim")])).unwrap();
        let text = render_posterior(OutputFormat::Json, &post, &snapshot).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["command"], "infer");
        assert_eq!(value["network"]["name"], "rain");
        assert_eq!(value["posterior"]["query"], "Chuva");
        assert_eq!(value["posterior"]["most_likely"], "sim");
        assert_eq!(value["posterior"]["outcomes"][0]["value"], "sim");
    }

    #[test]
    fn posterior_summary_line() {
        let (net, snapshot) = rain();
        let post = infer(&net, "GramaMolhada", &Assignment::new()).unwrap();
        let text = render_posterior(OutputFormat::Summary, &post, &snapshot).unwrap();
        assert_eq!(text, "P(GramaMolhada): sim=0.2600, não=0.7400");
    }

    #[test]
    fn markdown_has_table_rows() {
        let (net, snapshot) = rain();
        let post = infer(&net, "Chuva", &Assignment::new()).unwrap();
        let text = render_posterior(OutputFormat::Md, &post, &snapshot).unwrap();
        assert!(text.starts_with("# P(Chuva)"));
        assert!(text.contains("| sim | 0.2000 |"));
        assert!(text.contains("| não | 0.8000 |"));
    }

    #[test]
    fn exitcode_format_prints_nothing() {
        let (net, snapshot) = rain();
        let post = infer(&net, "Chuva", &Assignment::new()).unwrap();
        assert!(render_posterior(OutputFormat::Exitcode, &post, &snapshot).is_none());
        assert!(render_check(OutputFormat::Exitcode, &net, &snapshot).is_none());
        assert!(render_presets(OutputFormat::Exitcode, &[]).is_none());
    }

    #[test]
    fn joint_zero_has_null_log() {
        let (_, snapshot) = rain();
        let a = evidence(&[("Chuva", "sim"), ("GramaMolhada", "sim")]);
        let text = render_joint(OutputFormat::Json, &a, 0.0, f64::NEG_INFINITY, &snapshot).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value["log_probability"].is_null());
        assert_eq!(value["probability"], 0.0);
    }

    #[test]
    fn describe_lists_edges() {
        let (net, snapshot) = rain();
        let text = render_describe(OutputFormat::Json, &net, None, &snapshot).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["edges"][0]["from"], "Chuva");
        assert_eq!(value["edges"][0]["to"], "GramaMolhada");
        assert_eq!(value["nodes"][0]["children"][0], "GramaMolhada");
        assert_eq!(value["nodes"][1]["table_rows"], 2);

        let summary = render_describe(OutputFormat::Summary, &net, None, &snapshot).unwrap();
        assert_eq!(summary, "rain: 2 nodes, 1 edges (Chuva, GramaMolhada)");
    }

    #[test]
    fn check_counts_rows() {
        let (net, snapshot) = rain();
        let text = render_check(OutputFormat::Summary, &net, &snapshot).unwrap();
        assert_eq!(text, "ok: rain (2 nodes, 1 edges, 3 table rows)");
    }

    #[test]
    fn error_json_is_report() {
        let text = render_error(OutputFormat::Json, &Error::NoNetwork, false);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["error"]["code"], 13);
        assert_eq!(value["error"]["category"], "config");

        let human = render_error(OutputFormat::Md, &Error::NoNetwork, false);
        assert!(human.starts_with("✗ No Network"));
    }
}
