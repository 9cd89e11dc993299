// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de negócio: documento, áreas, notas, datas
    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("{entity} não encontrado(a): {id}")]
    NotFound { entity: &'static str, id: String },

    // Documento duplicado ou exclusão bloqueada por registros filhos
    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Backup inválido: {0}")]
    InvalidBackup(String),

    #[error("Erro de armazenamento: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Classificação conceitual usada pela interface para decidir como exibir a falha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::Validation(_) | AppError::InvalidBackup(_) => {
                ErrorKind::Validation
            }
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Storage(_) | AppError::Serialization(_) | AppError::InternalServerError(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Mensagem que vai para o campo `error` do repositório (o banner da interface).
    pub fn user_message(&self) -> String {
        match self {
            // Junta todas as mensagens de campo num texto só
            AppError::ValidationError(errors) => {
                let mut details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(m) => m.to_string(),
                            None => format!("Campo '{}' inválido.", field),
                        })
                    })
                    .collect();
                details.sort();
                if details.is_empty() {
                    "Um ou mais campos são inválidos.".to_string()
                } else {
                    details.join(" ")
                }
            }
            AppError::Validation(msg) | AppError::Conflict(msg) | AppError::InvalidBackup(msg) => {
                msg.clone()
            }
            AppError::NotFound { .. } => self.to_string(),
            // Erros internos: o detalhe vai para o log, o usuário vê uma mensagem genérica
            ref e => {
                tracing::error!("Erro interno: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_domain_errors() {
        assert_eq!(AppError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(AppError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(AppError::not_found("Fazenda", "farm-1").kind(), ErrorKind::NotFound);
        let io = std::io::Error::other("disco cheio");
        assert_eq!(AppError::from(io).kind(), ErrorKind::Internal);
    }

    #[test]
    fn internal_errors_hide_details_from_user() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exausto"));
        assert_eq!(err.user_message(), "Ocorreu um erro inesperado.");
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = AppError::not_found("Produtor", "prod-123");
        assert_eq!(err.user_message(), "Produtor não encontrado(a): prod-123");
    }
}
