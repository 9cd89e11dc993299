// src/db/producer_repo.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::validation::clean_document,
    db::state::{ErrorSink, PersistedList},
    db::storage::{KeyValueStore, PRODUCERS_KEY},
    models::producer::{DocumentType, Producer, ProducerStats},
};

// O repositório de produtores. Não valida nada: quem valida é o ProducerService.
#[derive(Clone)]
pub struct ProducerRepository {
    list: Arc<PersistedList<Producer>>,
}

impl ProducerRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            list: Arc::new(PersistedList::hydrate(PRODUCERS_KEY, store)),
        }
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub fn insert(&self, producer: Producer) {
        self.list.mutate(|items| items.push(producer));
    }

    /// Aplica `f` ao produtor (ativo ou não) e atualiza `updated_at`.
    pub fn update<F>(&self, id: &str, f: F) -> Option<Producer>
    where
        F: FnOnce(&mut Producer),
    {
        self.list.mutate(|items| {
            let producer = items.iter_mut().find(|p| p.id == id)?;
            f(producer);
            producer.updated_at = Utc::now();
            Some(producer.clone())
        })
    }

    // Exclusão lógica
    pub fn soft_delete(&self, id: &str) -> bool {
        self.update(id, |p| p.active = false).is_some()
    }

    pub fn set_farms_ids(&self, id: &str, farms_ids: Vec<String>) {
        self.list.mutate(|items| {
            if let Some(p) = items.iter_mut().find(|p| p.id == id) {
                p.farms_ids = farms_ids;
            }
        });
    }

    pub fn replace_all(&self, producers: Vec<Producer>) {
        self.list.mutate(|items| *items = producers);
    }

    // =========================================================================
    //  LEITURA (somente ativos, exceto `all`)
    // =========================================================================

    /// Todos os registros, inclusive os excluídos logicamente (backup).
    pub fn all(&self) -> Vec<Producer> {
        self.list.read().items.clone()
    }

    pub fn get_producer_by_id(&self, id: &str) -> Option<Producer> {
        self.list
            .read()
            .items
            .iter()
            .find(|p| p.active && p.id == id)
            .cloned()
    }

    pub fn get_active_producers(&self) -> Vec<Producer> {
        self.filter(|_| true)
    }

    /// Busca sem diferenciar maiúsculas em nome, documento e e-mail.
    pub fn search_producers(&self, term: &str) -> Vec<Producer> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_active_producers();
        }
        // Termo com cara de documento ("529.982.247") também casa com o documento limpo
        let looks_like_document = needle
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/' | ' '));
        let digits = if looks_like_document { clean_document(&needle) } else { String::new() };

        self.filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.document.contains(&needle)
                || (!digits.is_empty() && p.document.contains(&digits))
                || p
                    .email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
    }

    pub fn get_producers_by_document_type(&self, document_type: DocumentType) -> Vec<Producer> {
        self.filter(|p| p.document_type == document_type)
    }

    /// Produtor ativo dono do documento (já limpo), ignorando `exclude_id`.
    pub fn find_active_by_document(&self, document: &str, exclude_id: Option<&str>) -> Option<Producer> {
        self.list
            .read()
            .items
            .iter()
            .find(|p| p.active && p.document == document && Some(p.id.as_str()) != exclude_id)
            .cloned()
    }

    pub fn get_producer_stats(&self) -> ProducerStats {
        let state = self.list.read();
        let total = state.items.len();
        let active: Vec<&Producer> = state.items.iter().filter(|p| p.active).collect();

        ProducerStats {
            total,
            active: active.len(),
            inactive: total - active.len(),
            cpf_count: active.iter().filter(|p| p.document_type == DocumentType::Cpf).count(),
            cnpj_count: active.iter().filter(|p| p.document_type == DocumentType::Cnpj).count(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn set_loading(&self, loading: bool) {
        self.list.set_loading(loading);
    }

    pub fn last_error(&self) -> Option<String> {
        self.list.last_error()
    }

    fn filter(&self, pred: impl Fn(&Producer) -> bool) -> Vec<Producer> {
        self.list
            .read()
            .items
            .iter()
            .filter(|p| p.active && pred(p))
            .cloned()
            .collect()
    }
}

impl ErrorSink for ProducerRepository {
    fn set_error(&self, error: Option<String>) {
        self.list.set_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::storage::MemoryStore;

    fn producer(id: &str, name: &str, document: &str, document_type: DocumentType) -> Producer {
        let now = Utc::now();
        Producer {
            id: id.to_string(),
            document: document.to_string(),
            document_type,
            name: name.to_string(),
            email: Some(format!("{}@fazenda.com.br", id)),
            phone: None,
            photo: None,
            created_at: now,
            updated_at: now,
            active: true,
            farms_ids: vec![],
        }
    }

    fn repo() -> ProducerRepository {
        let repo = ProducerRepository::new(Arc::new(MemoryStore::new()));
        repo.insert(producer("prod-1", "João da Silva", "52998224725", DocumentType::Cpf));
        repo.insert(producer("prod-2", "Agro Cerrado Ltda", "11222333000181", DocumentType::Cnpj));
        repo.insert(producer("prod-3", "Maria Souza", "12345678909", DocumentType::Cpf));
        repo
    }

    #[test]
    fn search_is_case_insensitive_and_skips_inactive() {
        let repo = repo();
        assert_eq!(repo.search_producers("JOÃO").len(), 1);
        assert_eq!(repo.search_producers("529.982").len(), 1);
        assert_eq!(repo.search_producers("prod-2@").len(), 1);

        repo.soft_delete("prod-1");
        assert!(repo.search_producers("joão").is_empty());
        assert!(repo.get_producer_by_id("prod-1").is_none());
        assert_eq!(repo.all().len(), 3);
    }

    #[test]
    fn stats_count_active_by_document_type() {
        let repo = repo();
        repo.soft_delete("prod-3");

        let stats = repo.get_producer_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.cpf_count, 1);
        assert_eq!(stats.cnpj_count, 1);
    }

    #[test]
    fn state_survives_reload_from_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = ProducerRepository::new(store.clone());
        repo.insert(producer("prod-9", "Fazendeiro", "39053344705", DocumentType::Cpf));
        repo.set_error(Some("erro transitório".into()));

        let reloaded = ProducerRepository::new(store);
        assert_eq!(reloaded.get_active_producers().len(), 1);
        // Flags de interface não são persistidas
        assert_eq!(reloaded.last_error(), None);
    }

    #[test]
    fn find_by_document_excludes_self() {
        let repo = repo();
        assert!(repo.find_active_by_document("52998224725", None).is_some());
        assert!(repo.find_active_by_document("52998224725", Some("prod-1")).is_none());
    }

    #[test]
    fn document_type_filter_skips_inactive() {
        let repo = repo();
        let ids = |t| -> Vec<String> {
            repo.get_producers_by_document_type(t).into_iter().map(|p| p.id).collect()
        };
        assert_eq!(ids(DocumentType::Cpf), vec!["prod-1", "prod-3"]);
        assert_eq!(ids(DocumentType::Cnpj), vec!["prod-2"]);

        repo.soft_delete("prod-3");
        repo.soft_delete("prod-2");
        assert_eq!(ids(DocumentType::Cpf), vec!["prod-1"]);
        assert!(ids(DocumentType::Cnpj).is_empty());
    }
}
