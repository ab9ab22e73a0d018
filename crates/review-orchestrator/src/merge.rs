use std::collections::{BTreeMap, HashSet};

use review_telemetry::RunMetricsSnapshot;
use review_wire::{Finding, Severity};
use serde::{Deserialize, Serialize};

use crate::invoker::InvokeResult;

/// One agent's run, surfaced in the report's tool-runs-equivalent section
/// regardless of whether it produced findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
	pub agent_name: String,
	pub skill_id: String,
	pub finding_count: usize,
	pub error: Option<String>,
	pub retried: bool,
	pub duration_ms: u64,
}

/// The orchestrator's deterministic output: identical `InvokeResult` inputs
/// always produce a byte-identical JSON serialisation of this type (spec
/// §4.H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedReviewResult {
	pub findings: Vec<Finding>,
	pub by_severity: BTreeMap<Severity, usize>,
	pub agent_runs: Vec<AgentRun>,
	pub metrics: RunMetricsSnapshot,
}

/// Flattens, deduplicates, and sorts findings across every `InvokeResult`
/// from one fan-out (spec §4.H). Failed invocations contribute no findings
/// but still appear in `agent_runs`.
pub fn merge(results: &[InvokeResult], metrics: RunMetricsSnapshot) -> MergedReviewResult {
	let mut seen = HashSet::new();
	let mut findings = Vec::new();
	for result in results {
		for finding in &result.findings {
			if seen.insert(finding.dedup_key()) {
				findings.push(finding.clone());
			}
		}
	}

	findings.sort_by(|a, b| {
		b.severity
			.rank()
			.cmp(&a.severity.rank())
			.then_with(|| a.file.as_deref().unwrap_or("").cmp(b.file.as_deref().unwrap_or("")))
			.then_with(|| a.line.unwrap_or(0).cmp(&b.line.unwrap_or(0)))
			.then_with(|| a.title.cmp(&b.title))
	});

	let mut by_severity = BTreeMap::new();
	for severity in Severity::ALL {
		by_severity.insert(severity, findings.iter().filter(|f| f.severity == severity).count());
	}

	let agent_runs = results
		.iter()
		.map(|result| AgentRun {
			agent_name: result.agent_name.clone(),
			skill_id: result.skill_id.clone(),
			finding_count: result.findings.len(),
			error: result.error.clone(),
			retried: result.retried,
			duration_ms: result.duration_ms,
		})
		.collect();

	MergedReviewResult { findings, by_severity, agent_runs, metrics }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn finding(severity: Severity, title: &str, file: Option<&str>, line: Option<u32>) -> Finding {
		Finding { severity, title: title.to_string(), evidence: "e".to_string(), recommendation: "r".to_string(), file: file.map(str::to_string), line }
	}

	fn result(agent: &str, findings: Vec<Finding>) -> InvokeResult {
		InvokeResult { agent_name: agent.to_string(), skill_id: "review.security".to_string(), findings, error: None, retried: false, duration_ms: 10 }
	}

	fn empty_metrics() -> RunMetricsSnapshot {
		RunMetricsSnapshot { correlation_id: "test".to_string(), total_duration_ms: Some(0), agent_latencies: Default::default(), tool_latencies: Default::default() }
	}

	#[test]
	fn dedups_across_agents_keeping_first_occurrence() {
		let a = result("security", vec![finding(Severity::High, "dup", Some("a.rs"), Some(1))]);
		let b = result("style", vec![finding(Severity::High, "dup", Some("a.rs"), Some(1))]);
		let merged = merge(&[a, b], empty_metrics());
		assert_eq!(merged.findings.len(), 1);
	}

	#[test]
	fn sorts_by_severity_then_file_then_line_then_title() {
		let findings = vec![
			finding(Severity::Low, "z", Some("b.rs"), Some(1)),
			finding(Severity::Critical, "a", Some("a.rs"), Some(5)),
			finding(Severity::Critical, "a", Some("a.rs"), Some(1)),
		];
		let merged = merge(&[result("x", findings)], empty_metrics());
		assert_eq!(merged.findings[0].line, Some(1));
		assert_eq!(merged.findings[1].line, Some(5));
		assert_eq!(merged.findings[2].severity, Severity::Low);
	}

	#[test]
	fn by_severity_includes_zero_counts() {
		let merged = merge(&[result("x", vec![finding(Severity::Critical, "a", None, None)])], empty_metrics());
		assert_eq!(merged.by_severity[&Severity::Critical], 1);
		assert_eq!(merged.by_severity[&Severity::Low], 0);
	}

	#[test]
	fn failed_invocation_contributes_no_findings_but_appears_in_agent_runs() {
		let failed = InvokeResult { agent_name: "flaky".to_string(), skill_id: "review.security".to_string(), findings: vec![], error: Some("Timeout after 5000ms".to_string()), retried: true, duration_ms: 5000 };
		let merged = merge(&[failed], empty_metrics());
		assert!(merged.findings.is_empty());
		assert_eq!(merged.agent_runs.len(), 1);
		assert_eq!(merged.agent_runs[0].error.as_deref(), Some("Timeout after 5000ms"));
	}
}
