// src/services/producer_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::{AppError, AppResult},
    common::validation::{clean_document, generate_id, validate_document, EntityKind},
    db::{CropRepository, FarmRepository, ProducerRepository},
    models::producer::{
        CreateProducerPayload, DocumentType, Producer, ProducerWithFarms, UpdateProducerPayload,
    },
    services::record,
};

#[derive(Clone)]
pub struct ProducerService {
    producers: ProducerRepository,
    farms: FarmRepository,
    crops: CropRepository,
}

impl ProducerService {
    pub fn new(producers: ProducerRepository, farms: FarmRepository, crops: CropRepository) -> Self {
        Self { producers, farms, crops }
    }

    pub fn repository(&self) -> &ProducerRepository {
        &self.producers
    }

    // =========================================================================
    //  CADASTRO
    // =========================================================================

    /// Documento precisa ser válido para o tipo e não pode pertencer a outro produtor ativo.
    /// Grava o documento limpo e começa sem fazendas.
    pub fn create_producer(&self, payload: CreateProducerPayload) -> AppResult<Producer> {
        let result = self.try_create(payload);
        record(&self.producers, "create_producer", result)
    }

    fn try_create(&self, payload: CreateProducerPayload) -> AppResult<Producer> {
        payload.validate()?;

        let document = self.checked_document(&payload.document, payload.document_type, None)?;

        let now = Utc::now();
        let producer = Producer {
            id: generate_id(EntityKind::Producer),
            document,
            document_type: payload.document_type,
            name: payload.name.trim().to_string(),
            email: payload.email,
            phone: payload.phone,
            photo: payload.photo,
            created_at: now,
            updated_at: now,
            active: true,
            farms_ids: Vec::new(),
        };

        self.producers.insert(producer.clone());
        tracing::info!(producer_id = %producer.id, document_type = producer.document_type.as_str(), "produtor cadastrado");
        Ok(producer)
    }

    pub fn update_producer(&self, id: &str, payload: UpdateProducerPayload) -> AppResult<Producer> {
        let result = self.try_update(id, payload);
        record(&self.producers, "update_producer", result)
    }

    fn try_update(&self, id: &str, payload: UpdateProducerPayload) -> AppResult<Producer> {
        let current = self
            .producers
            .get_producer_by_id(id)
            .ok_or_else(|| AppError::not_found("Produtor", id))?;

        payload.validate()?;

        // Documento ou tipo mudou: revalida e checa unicidade sem contar o próprio produtor
        let document = if payload.touches_document() {
            let document_type = payload.document_type.unwrap_or(current.document_type);
            let raw = payload.document.as_deref().unwrap_or(&current.document);
            Some((self.checked_document(raw, document_type, Some(id))?, document_type))
        } else {
            None
        };

        let updated = self
            .producers
            .update(id, |p| {
                if let Some((doc, doc_type)) = document {
                    p.document = doc;
                    p.document_type = doc_type;
                }
                if let Some(name) = payload.name {
                    p.name = name.trim().to_string();
                }
                if payload.email.is_some() {
                    p.email = payload.email;
                }
                if payload.phone.is_some() {
                    p.phone = payload.phone;
                }
                if payload.photo.is_some() {
                    p.photo = payload.photo;
                }
            })
            .ok_or_else(|| AppError::not_found("Produtor", id))?;

        tracing::info!(producer_id = %id, "produtor atualizado");
        Ok(updated)
    }

    /// Bloqueado enquanto houver fazenda ativa do produtor.
    pub fn delete_producer(&self, id: &str) -> AppResult<()> {
        let result = self.try_delete(id);
        record(&self.producers, "delete_producer", result)
    }

    fn try_delete(&self, id: &str) -> AppResult<()> {
        if self.producers.get_producer_by_id(id).is_none() {
            return Err(AppError::not_found("Produtor", id));
        }

        let farm_count = self.farms.get_farms_by_producer(id).len();
        if farm_count > 0 {
            return Err(AppError::conflict(format!(
                "Não é possível excluir o produtor: existem {} fazenda(s) vinculada(s).",
                farm_count
            )));
        }

        self.producers.soft_delete(id);
        tracing::info!(producer_id = %id, "produtor excluído");
        Ok(())
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub fn get_producer_with_farms(&self, id: &str) -> AppResult<ProducerWithFarms> {
        let producer = self
            .producers
            .get_producer_by_id(id)
            .ok_or_else(|| AppError::not_found("Produtor", id))?;

        let farms = self.farms.get_farms_by_producer(id);
        let total_area: Decimal = farms.iter().map(|f| f.total_area).sum();
        let crop_count = farms
            .iter()
            .map(|f| self.crops.count_active_for_farm(&f.id))
            .sum();

        Ok(ProducerWithFarms { producer, farms, total_area, crop_count })
    }

    // Limpa, valida dígitos verificadores e checa duplicidade entre ativos
    fn checked_document(
        &self,
        raw: &str,
        document_type: DocumentType,
        exclude_id: Option<&str>,
    ) -> AppResult<String> {
        let document = clean_document(raw);
        if !validate_document(&document, document_type) {
            return Err(AppError::validation(format!(
                "{} inválido: {}",
                document_type.as_str(),
                raw
            )));
        }

        if self.producers.find_active_by_document(&document, exclude_id).is_some() {
            return Err(AppError::conflict(format!(
                "Já existe um produtor ativo com este {}.",
                document_type.as_str()
            )));
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorKind;
    use crate::db::MemoryStore;
    use std::sync::Arc;

    fn service() -> ProducerService {
        let store: Arc<dyn crate::db::KeyValueStore> = Arc::new(MemoryStore::new());
        ProducerService::new(
            ProducerRepository::new(store.clone()),
            FarmRepository::new(store.clone()),
            CropRepository::new(store),
        )
    }

    fn payload(document: &str, document_type: DocumentType) -> CreateProducerPayload {
        CreateProducerPayload {
            document: document.to_string(),
            document_type,
            name: "João da Silva".to_string(),
            email: Some("joao@fazenda.com.br".to_string()),
            phone: None,
            photo: None,
        }
    }

    #[test]
    fn stores_clean_document_and_empty_farm_list() {
        let service = service();
        let producer = service
            .create_producer(payload("529.982.247-25", DocumentType::Cpf))
            .unwrap();

        assert!(producer.id.starts_with("prod-"));
        assert_eq!(producer.document, "52998224725");
        assert!(producer.farms_ids.is_empty());
        assert!(producer.active);
        assert_eq!(service.repository().last_error(), None);
    }

    #[test]
    fn rejects_invalid_document_and_records_error() {
        let service = service();
        let err = service
            .create_producer(payload("111.111.111-11", DocumentType::Cpf))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(service.repository().last_error().is_some());
        assert!(service.repository().get_active_producers().is_empty());
    }

    #[test]
    fn rejects_invalid_email_through_validator() {
        let service = service();
        let mut p = payload("52998224725", DocumentType::Cpf);
        p.email = Some("nao-e-email".to_string());

        let err = service.create_producer(p).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(
            service.repository().last_error().as_deref(),
            Some("O e-mail fornecido é inválido.")
        );
    }

    #[test]
    fn update_rechecks_uniqueness_excluding_self() {
        let service = service();
        let a = service.create_producer(payload("52998224725", DocumentType::Cpf)).unwrap();
        let b = service.create_producer(payload("12345678909", DocumentType::Cpf)).unwrap();

        // Reenviar o próprio documento não conflita
        let same = UpdateProducerPayload {
            document: Some("529.982.247-25".to_string()),
            ..Default::default()
        };
        assert!(service.update_producer(&a.id, same).is_ok());

        let steal = UpdateProducerPayload {
            document: Some("52998224725".to_string()),
            ..Default::default()
        };
        let err = service.update_producer(&b.id, steal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            service.repository().get_producer_by_id(&b.id).unwrap().document,
            "12345678909"
        );
    }

    #[test]
    fn changing_type_revalidates_document() {
        let service = service();
        let a = service.create_producer(payload("52998224725", DocumentType::Cpf)).unwrap();

        let to_cnpj = UpdateProducerPayload {
            document_type: Some(DocumentType::Cnpj),
            ..Default::default()
        };
        assert!(service.update_producer(&a.id, to_cnpj).is_err());

        let to_valid_cnpj = UpdateProducerPayload {
            document: Some("11.222.333/0001-81".to_string()),
            document_type: Some(DocumentType::Cnpj),
            ..Default::default()
        };
        let updated = service.update_producer(&a.id, to_valid_cnpj).unwrap();
        assert_eq!(updated.document, "11222333000181");
        assert_eq!(updated.document_type, DocumentType::Cnpj);
    }

    #[test]
    fn deleted_producer_frees_document() {
        let service = service();
        let a = service.create_producer(payload("52998224725", DocumentType::Cpf)).unwrap();
        service.delete_producer(&a.id).unwrap();

        assert!(service.create_producer(payload("52998224725", DocumentType::Cpf)).is_ok());
        assert_eq!(service.repository().get_producer_stats().total, 2);
    }

    #[test]
    fn unknown_producer_is_not_found() {
        let service = service();
        let err = service.delete_producer("prod-x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
