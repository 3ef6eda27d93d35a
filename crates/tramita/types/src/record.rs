//! The audit record: the externally readable durable format.
//!
//! One record per accepted transition, append-only and ordered per
//! entity. Recorded variant, state and transition names are never renamed
//! or removed as catalogs evolve, only deprecated, so old records stay
//! readable.

use crate::{ActorId, EntityId, RoleId, StateId, TransitionId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a supporting document attached to a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub name: String,
    /// Opaque location understood by the surrounding application
    /// (object-store key, URL…). The core never dereferences it.
    pub location: String,
}

impl AttachmentRef {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Caller-supplied context for one transition attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
}

impl TransitionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// One accepted transition, as persisted in the audit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub entity_id: EntityId,
    pub variant: VariantId,
    pub transition: TransitionId,
    pub from_state: StateId,
    pub to_state: StateId,
    pub actor: ActorId,
    /// The actor's role at the time of the transition. Roles change;
    /// the record keeps what was true then.
    pub role: RoleId,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
}

impl TransitionRecord {
    /// Whether this record was produced by a scheduled process rather
    /// than an interactive user.
    pub fn is_system(&self) -> bool {
        self.role.is_system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> TransitionRecord {
        TransitionRecord {
            entity_id: EntityId::new("pedido-1"),
            variant: VariantId::new("pedido-escola"),
            transition: TransitionId::new("inicia_fluxo"),
            from_state: StateId::new("RASCUNHO"),
            to_state: StateId::new("DRE_A_VALIDAR"),
            actor: ActorId::new("diretor-1"),
            role: RoleId::new("ESCOLA"),
            timestamp: Utc::now(),
            justification: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = make_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: TransitionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        // Optional fields are elided from the durable format when empty.
        assert!(!json.contains("justification"));
        assert!(!json.contains("attachments"));
    }

    #[test]
    fn test_payload_builder() {
        let payload = TransitionPayload::new()
            .with_justification("aluno com restrição alimentar")
            .with_attachment(AttachmentRef::new("laudo.pdf", "s3://docs/laudo.pdf"));
        assert_eq!(
            payload.justification.as_deref(),
            Some("aluno com restrição alimentar")
        );
        assert_eq!(payload.attachments.len(), 1);
    }

    #[test]
    fn test_system_record_detection() {
        let mut record = make_record();
        assert!(!record.is_system());
        record.role = RoleId::system();
        assert!(record.is_system());
    }
}
