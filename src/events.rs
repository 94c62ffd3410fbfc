use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Timer transitions published on the controller's broadcast channel.
/// A presentation layer subscribes to repaint; tests subscribe to observe.
/// Serializes camelCase throughout, matching the snapshot and task types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimerEvent {
    Started {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    Reset {
        mode: Mode,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// The countdown hit zero. `credited_task_id` names the task whose
    /// session count was bumped, set only for focus-mode expiries.
    Completed {
        mode: Mode,
        credited_task_id: Option<String>,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = TimerEvent::Completed {
            mode: Mode::Focus,
            credited_task_id: None,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "completed");
        assert_eq!(json["mode"], "focus");
        assert!(json["creditedTaskId"].is_null());
    }

    #[test]
    fn event_payloads_serialize_camel_case() {
        let event = TimerEvent::Started {
            mode: Mode::ShortBreak,
            remaining_secs: 300,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "started");
        assert_eq!(json["remainingSecs"], 300);
        assert!(json.get("remaining_secs").is_none());
    }
}
