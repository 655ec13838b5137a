use rmz_core::{GameDocument, LogEvent, RoleKind, WorkflowState};
use rmz_validate::{default_rules, validate_with, Rule};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::{
    generator::advise,
    role::{Role, Tools},
};

/// SHA-256 over the document's JSON form.
pub fn document_fingerprint(doc: &GameDocument) -> String {
    let bytes = serde_json::to_vec(doc).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

/// Validates the document during the testing stage. Never touches the queue.
pub struct Tester {
    rules: Vec<Box<dyn Rule>>,
    tools: Tools,
}

impl Tester {
    pub fn new(tools: Tools) -> Self {
        Self { rules: default_rules(), tools }
    }

    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }
}

impl Role for Tester {
    fn kind(&self) -> RoleKind {
        RoleKind::Tester
    }

    fn process(&self, state: &mut WorkflowState) {
        state.ensure_role(RoleKind::Tester);

        let fingerprint = document_fingerprint(&state.game_document);
        let already_checked = state
            .role(RoleKind::Tester)
            .and_then(|r| r.working_data.get("validated_fingerprint"))
            .and_then(Value::as_str)
            == Some(fingerprint.as_str());
        if already_checked {
            debug!(role = %RoleKind::Tester, "document unchanged since last validation");
            state.record(LogEvent::Idle { role: RoleKind::Tester });
            return;
        }

        let findings = validate_with(&self.rules, &state.game_document);
        let failures = findings.iter().filter(|f| f.is_failure()).count();
        info!(role = %RoleKind::Tester, findings = findings.len(), failures, "document validated");

        advise(
            self.tools.generator.as_ref(),
            state,
            RoleKind::Tester,
            None,
            json!({ "findings": findings.len(), "failures": failures }),
        );

        let count = findings.len();
        if let Some(role) = state.role_mut(RoleKind::Tester) {
            role.working_data.insert("issues_found".to_string(), json!(findings));
            role.working_data.insert("validated_fingerprint".to_string(), json!(fingerprint));
        }
        state.record(LogEvent::Validation { findings: count, failures });
    }
}
