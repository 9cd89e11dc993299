// src/models/producer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::farm::Farm;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Cpf,  // Pessoa física, 11 dígitos
    Cnpj, // Pessoa jurídica, 14 dígitos
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cpf => "CPF",
            DocumentType::Cnpj => "CNPJ",
        }
    }
}

// Representa um produtor rural
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub id: String,

    // Sempre somente dígitos
    pub document: String,
    pub document_type: DocumentType,

    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Exclusão lógica
    pub active: bool,

    // Cache das fazendas ativas, mantido pelo FarmService
    #[serde(default)]
    pub farms_ids: Vec<String>,
}

// Dados para cadastro de um novo produtor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProducerPayload {
    pub document: String,
    pub document_type: DocumentType,

    #[validate(length(min = 2, max = 120, message = "O nome deve ter entre 2 e 120 caracteres."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 20, message = "O telefone deve ter entre 8 e 20 caracteres."))]
    pub phone: Option<String>,

    pub photo: Option<String>,
}

// Atualização parcial: só os campos presentes são alterados
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProducerPayload {
    pub document: Option<String>,
    pub document_type: Option<DocumentType>,

    #[validate(length(min = 2, max = 120, message = "O nome deve ter entre 2 e 120 caracteres."))]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 20, message = "O telefone deve ter entre 8 e 20 caracteres."))]
    pub phone: Option<String>,

    pub photo: Option<String>,
}

impl UpdateProducerPayload {
    pub fn touches_document(&self) -> bool {
        self.document.is_some() || self.document_type.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProducerStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    // Contagens entre os ativos
    pub cpf_count: usize,
    pub cnpj_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerWithFarms {
    pub producer: Producer,
    pub farms: Vec<Farm>,
    pub total_area: Decimal,
    pub crop_count: usize,
}
