use rmz_core::{LogEvent, RoleKind, Task, WorkflowState};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Context handed to the text backend: a document snapshot, the task at hand
/// and whatever the role wants to add.
#[derive(Clone, Debug, Serialize)]
pub struct GenerationRequest {
    pub role: RoleKind,
    pub document: Value,
    pub task: Option<Value>,
    pub details: Value,
}

/// Source of free-text advice. Responses are logged, never interpreted.
pub trait ContentGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> String;
}

/// Stands in when no backend is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderGenerator;

impl ContentGenerator for PlaceholderGenerator {
    fn generate(&self, request: &GenerationRequest) -> String {
        format!("[{} placeholder: no content generator configured]", request.role)
    }
}

/// Ask `generator` for advice and record that it answered.
pub fn advise(
    generator: &dyn ContentGenerator,
    state: &mut WorkflowState,
    role: RoleKind,
    task: Option<&Task>,
    details: Value,
) {
    let request = GenerationRequest {
        role,
        document: serde_json::to_value(&state.game_document).unwrap_or(Value::Null),
        task: task.and_then(|t| serde_json::to_value(t).ok()),
        details,
    };
    let response = generator.generate(&request);
    debug!(role = %role, response = %response, "advice received");
    state.record(LogEvent::Advice { role, chars: response.chars().count() });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording(Mutex<Vec<GenerationRequest>>);

    impl ContentGenerator for Recording {
        fn generate(&self, request: &GenerationRequest) -> String {
            self.0.lock().unwrap().push(request.clone());
            "build a harbor".to_string()
        }
    }

    #[test]
    fn advice_is_recorded_not_applied() {
        let generator = Recording(Mutex::new(vec![]));
        let mut state = WorkflowState::new("Epic", "");
        let before = state.game_document.clone();
        advise(&generator, &mut state, RoleKind::WorldBuilder, None, serde_json::json!({"k": 1}));

        assert_eq!(state.game_document, before);
        assert_eq!(state.log.last().unwrap().event, LogEvent::Advice { role: RoleKind::WorldBuilder, chars: 14 });
        let seen = generator.0.lock().unwrap();
        assert_eq!(seen[0].document["metadata"]["title"], "Epic");
        assert!(seen[0].task.is_none());
    }

    #[test]
    fn placeholder_names_role() {
        let req = GenerationRequest { role: RoleKind::Tester, document: Value::Null, task: None, details: Value::Null };
        assert!(PlaceholderGenerator.generate(&req).contains("tester"));
    }
}
