use review_wire::Severity;

use crate::merge::MergedReviewResult;

/// Human-readable rendering of a merge result (spec §4.I). Not wired to a
/// CLI — reachable only from the library API and the JSON-plus-text HTTP
/// response.
pub fn to_text(merged: &MergedReviewResult) -> String {
	let critical = merged.by_severity.get(&Severity::Critical).copied().unwrap_or(0);
	let high = merged.by_severity.get(&Severity::High).copied().unwrap_or(0);
	let medium = merged.by_severity.get(&Severity::Medium).copied().unwrap_or(0);
	let low = merged.by_severity.get(&Severity::Low).copied().unwrap_or(0);

	let mut out = format!("Review summary: {critical} critical, {high} high, {medium} medium, {low} low\n");

	for severity in Severity::ALL.iter().rev() {
		let findings: Vec<_> = merged.findings.iter().filter(|f| f.severity == *severity).collect();
		if findings.is_empty() {
			continue;
		}
		out.push('\n');
		out.push_str(&format!("{}\n", severity.as_str().to_uppercase()));
		for finding in findings {
			out.push_str(&format!("[{}] {}; {}; {}", finding.severity, finding.title, finding.evidence, finding.recommendation));
			if let Some(file) = &finding.file {
				match finding.line {
					Some(line) => out.push_str(&format!("; {file}:{line}")),
					None => out.push_str(&format!("; {file}")),
				}
			}
			out.push('\n');
		}
	}

	out.push_str("\nAgent runs:\n");
	for run in &merged.agent_runs {
		match &run.error {
			Some(error) => out.push_str(&format!("- {} ({}): error - {} ({}ms)\n", run.agent_name, run.skill_id, error, run.duration_ms)),
			None => out.push_str(&format!(
				"- {} ({}): {} finding(s) ({}ms{})\n",
				run.agent_name,
				run.skill_id,
				run.finding_count,
				run.duration_ms,
				if run.retried { ", retried" } else { "" }
			)),
		}
	}

	out
}

/// JSON rendering, used by the HTTP entrypoint's response body.
pub fn to_json(merged: &MergedReviewResult) -> serde_json::Value {
	serde_json::to_value(merged).expect("MergedReviewResult always serializes")
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use review_telemetry::RunMetricsSnapshot;
	use review_wire::Finding;

	use super::*;
	use crate::merge::AgentRun;

	fn merged_with(findings: Vec<Finding>) -> MergedReviewResult {
		let mut by_severity = BTreeMap::new();
		for severity in Severity::ALL {
			by_severity.insert(severity, findings.iter().filter(|f| f.severity == severity).count());
		}
		MergedReviewResult {
			findings,
			by_severity,
			agent_runs: vec![AgentRun { agent_name: "security".to_string(), skill_id: "review.security".to_string(), finding_count: 1, error: None, retried: false, duration_ms: 42 }],
			metrics: RunMetricsSnapshot { correlation_id: "abc".to_string(), total_duration_ms: Some(42), agent_latencies: Default::default(), tool_latencies: Default::default() },
		}
	}

	#[test]
	fn summary_line_counts_each_severity() {
		let findings = vec![Finding { severity: Severity::Critical, title: "API key".to_string(), evidence: "e".to_string(), recommendation: "r".to_string(), file: Some("a.rs".to_string()), line: Some(3) }];
		let text = to_text(&merged_with(findings));
		assert!(text.starts_with("Review summary: 1 critical, 0 high, 0 medium, 0 low\n"));
		assert!(text.contains("[critical] API key; e; r; a.rs:3"));
	}

	#[test]
	fn renders_agent_run_errors() {
		let mut merged = merged_with(vec![]);
		merged.agent_runs[0].error = Some("Timeout after 5000ms".to_string());
		let text = to_text(&merged);
		assert!(text.contains("error - Timeout after 5000ms"));
	}
}
