use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_types::NodeId;

/// Progress event for a long-running remote task.
///
/// `revision` increases with every event of the same task, so listeners can
/// discard stale updates after a reconnect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub task_id: Uuid,
    pub revision: u64,
    #[serde(flatten)]
    pub kind: TaskEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskEventKind {
    #[serde(rename_all = "camelCase")]
    Started { node_id: NodeId, name: String },
    Stopped,
    #[serde(rename_all = "camelCase")]
    MessageUpdated { message: String },
}

impl TaskEvent {
    pub fn new(task_id: Uuid, revision: u64, kind: TaskEventKind) -> Self {
        Self {
            task_id,
            revision,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_wire_format() {
        let event = TaskEvent::new(
            Uuid::nil(),
            1,
            TaskEventKind::Started {
                node_id: "n1".into(),
                name: "loadflow".into(),
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json.get("type").unwrap(), "started");
        assert_eq!(json.get("revision").unwrap(), 1);
        assert_eq!(json.get("nodeId").unwrap(), "n1");
    }

    #[test]
    fn message_roundtrip() {
        let event = TaskEvent::new(
            Uuid::nil(),
            7,
            TaskEventKind::MessageUpdated {
                message: "50% done".into(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: TaskEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn stopped_has_no_extra_fields() {
        let event = TaskEvent::new(Uuid::nil(), 2, TaskEventKind::Stopped);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json.get("type").unwrap(), "stopped");
        assert!(json.get("message").is_none());
    }
}
