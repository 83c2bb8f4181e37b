//! Agent Prompts
//!
//! The fixed instruction contract and the incident message that opens every
//! transcript.

use responder_core::{IncidentRequest, RetrievedDocument};
use responder_tools::{HEALTH_CHECK, SEARCH_LOGS};

/// Build the system prompt. Not user-configurable.
pub fn system_prompt() -> String {
    format!(
        r###"You are a Senior Site Reliability Engineer (SRE) agent.
Your goal is to diagnose incidents by strictly following the provided RUNBOOKS.

## The ReAct Protocol
Alternate between THOUGHT, ACTION and OBSERVATION.

1. THOUGHT: analyze the user issue against the runbook context.
   - First identify the exact "## Alert: ..." header in the context that matches the issue and quote it.
   - If several alerts are present, pick the ONE that best matches the symptoms.
   - Every runbook document is delimited by START and END markers. Never combine fields from different documents.

2. ACTION: call a tool when you need more information.
   - `{health}(serviceName)`: returns UP or DOWN with recent system logs.
   - `{search}(query)`: returns the log match count, sample trace ids, affected pods and a summary.
   - When using `{search}`, copy the Lucene query EXACTLY as written in the chosen alert section.

3. OBSERVATION: the tool output is returned to you. Use it as evidence.

## Termination
When you have enough evidence, or the runbook instructions are unambiguous, STOP and output the final report.
Copy remediation steps from the chosen alert; do not summarize or invent them.

## FINAL OUTPUT FORMAT
Output ONLY the raw JSON object (no markdown, no conversational text):
{{
  "failureType": "String (the name of the alert you identified)",
  "rootCauseHypothesis": "String",
  "investigationQuery": "String (the exact Lucene query used)",
  "evidence": {{ "tool_name": "result_summary" }},
  "responsibleTeam": "String",
  "remediationSteps": [ "Step 1", "Step 2" ],
  "requiresEscalation": boolean
}}"###,
        health = HEALTH_CHECK,
        search = SEARCH_LOGS,
    )
}

/// Render the retrieved documents as one context block, each document
/// wrapped in its own numbered START/END markers.
pub fn context_block(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let n = i + 1;
            format!(
                "=== RUNBOOK DOCUMENT {n} START (service: {service}) ===\n{text}\n=== RUNBOOK DOCUMENT {n} END ===",
                service = doc.service_name().unwrap_or("unknown"),
                text = doc.text.trim(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The opening user message of a run.
pub fn incident_message(request: &IncidentRequest, documents: &[RetrievedDocument]) -> String {
    format!(
        "CONTEXT:\n{}\n\nSERVICE: {}\nTIME WINDOW: {}\nUSER ISSUE: {}",
        context_block(documents),
        request.service_name,
        request.time_window(),
        request.issue
    )
}

/// Re-prompt sent after a reply that neither called a tool nor held a verdict.
pub fn correction(reason: &str) -> String {
    format!(
        "Your last reply did not contain a valid final report ({}). Either call a tool, or output ONLY the raw JSON object described in FINAL OUTPUT FORMAT.",
        reason
    )
}
