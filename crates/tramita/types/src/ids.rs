//! Identifiers shared across the tramita crates.
//!
//! Variant, state, transition and role identifiers are stable names: once
//! recorded in the audit log they are never renamed, only deprecated.
//! Entity and actor identifiers are opaque references owned by the
//! surrounding application.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id! {
    /// Identifier of one independently defined state machine
    VariantId
}

string_id! {
    /// A named member of a variant's closed state set
    StateId
}

string_id! {
    /// A named transition, unique within its variant
    TransitionId
}

string_id! {
    /// An organizational role (school, regional office, central authority, vendor…)
    RoleId
}

string_id! {
    /// Identity of the person or process driving a transition
    ActorId
}

string_id! {
    /// Identifier of a declared side effect, resolved by the effect registry
    EffectId
}

string_id! {
    /// Identity of a workflowable entity
    EntityId
}

impl EntityId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// First 8 characters, for log-friendly prefixes. Safe on
    /// application-supplied ids with multibyte characters.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((cut, _)) => &self.0[..cut],
            None => &self.0,
        }
    }
}

/// Reserved role id for scheduled processes. Transitions driven by the
/// deadline scanner are recorded under this role, never an interactive user.
pub const SYSTEM_ROLE: &str = "SISTEMA";

impl RoleId {
    /// The reserved scheduler role.
    pub fn system() -> Self {
        Self::new(SYSTEM_ROLE)
    }

    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_ROLE
    }
}

/// The identity on whose behalf a transition is attempted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: RoleId,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: RoleId) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }

    /// The reserved system actor used by scheduled processes.
    pub fn system() -> Self {
        Self {
            id: ActorId::new("sistema"),
            role: RoleId::system(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_from() {
        let state = StateId::from("RASCUNHO");
        assert_eq!(format!("{}", state), "RASCUNHO");
        assert_eq!(state.as_str(), "RASCUNHO");
        assert_eq!(state, StateId::new("RASCUNHO"));
    }

    #[test]
    fn test_entity_id_generate() {
        let id = EntityId::generate();
        assert!(!id.0.is_empty());
        assert!(id.short().len() <= 8);
        assert_ne!(id, EntityId::generate());
    }

    #[test]
    fn test_entity_id_short_respects_char_boundaries() {
        assert_eq!(EntityId::new("pedido-{uuid}").short(), "pedido-{");
        assert_eq!(EntityId::new("curto").short(), "curto");
        // Application-supplied ids may carry a multibyte character
        // straddling the eighth byte.
        assert_eq!(EntityId::new("cardapiões-2026").short(), "cardapiõ");
        assert_eq!(EntityId::new("solicitação").short(), "solicita");
    }

    #[test]
    fn test_system_actor() {
        let actor = Actor::system();
        assert!(actor.role.is_system());
        assert_eq!(actor.role, RoleId::system());
        assert!(!RoleId::new("ESCOLA").is_system());
    }

    #[test]
    fn test_id_serde_is_transparent_string() {
        let json = serde_json::to_string(&VariantId::new("dieta-especial")).unwrap();
        assert_eq!(json, "\"dieta-especial\"");
    }
}
