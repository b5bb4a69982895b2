use thiserror::Error;

/// Erreurs typées du moteur
///
/// Chaque échec est synchrone et laisse l'état du moteur strictement
/// inchangé : les gardes sont évaluées avant toute mutation. Le moteur
/// ne retente jamais rien lui-même, l'appelant décide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Le rôle de l'appelant ne permet pas l'opération
    #[error("accès refusé pour '{caller}': rôle {required} requis")]
    Unauthorized {
        caller: String,
        required: &'static str,
    },

    /// L'opération est invalide dans l'état courant du système
    #[error("état invalide: {0}")]
    InvalidState(&'static str),

    /// Identifiant de règle ou d'entrée de journal hors de la plage émise
    #[error("{kind} {id} introuvable")]
    NotFound { kind: &'static str, id: u64 },

    /// Argument rejeté avant toute mutation
    #[error("argument invalide: {0}")]
    InvalidArgument(&'static str),
}

impl EngineError {
    pub fn unauthorized(caller: &str, required: &'static str) -> Self {
        EngineError::Unauthorized {
            caller: caller.to_string(),
            required,
        }
    }

    pub fn not_found(kind: &'static str, id: u64) -> Self {
        EngineError::NotFound { kind, id }
    }
}
