// src/common/validation.rs
//
// Funções puras: documentos (CPF/CNPJ), áreas e geração de IDs.

use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::producer::DocumentType;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Remove tudo que não for dígito ("529.982.247-25" -> "52998224725").
pub fn clean_document(document: &str) -> String {
    document.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Deduz o tipo pelo número de dígitos.
pub fn detect_document_type(document: &str) -> Option<DocumentType> {
    match clean_document(document).len() {
        CPF_LEN => Some(DocumentType::Cpf),
        CNPJ_LEN => Some(DocumentType::Cnpj),
        _ => None,
    }
}

/// Valida CPF/CNPJ: tamanho, sequências repetidas ("11111111111") e dígitos verificadores (módulo 11).
pub fn validate_document(document: &str, document_type: DocumentType) -> bool {
    let digits = to_digits(&clean_document(document));

    let expected_len = match document_type {
        DocumentType::Cpf => CPF_LEN,
        DocumentType::Cnpj => CNPJ_LEN,
    };
    if digits.len() != expected_len || is_repunit(&digits) {
        return false;
    }

    match document_type {
        DocumentType::Cpf => {
            let first = cpf_check_digit(&digits[..9]);
            let second = cpf_check_digit(&digits[..10]);
            digits[9] == first && digits[10] == second
        }
        DocumentType::Cnpj => {
            let first = weighted_check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS);
            let second = weighted_check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS);
            digits[12] == first && digits[13] == second
        }
    }
}

/// CPF como `XXX.XXX.XXX-XX`, CNPJ como `XX.XXX.XXX/XXXX-XX`.
/// Entrada com quantidade errada de dígitos volta apenas limpa, sem máscara.
pub fn format_document(document: &str, document_type: DocumentType) -> String {
    let d = clean_document(document);
    match document_type {
        DocumentType::Cpf if d.len() == CPF_LEN => {
            format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
        }
        DocumentType::Cnpj if d.len() == CNPJ_LEN => format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        ),
        _ => d,
    }
}

/// `agricultural + vegetation <= total`, nenhuma área negativa.
pub fn validate_farm_areas(total: Decimal, agricultural: Decimal, vegetation: Decimal) -> bool {
    if total.is_sign_negative() || agricultural.is_sign_negative() || vegetation.is_sign_negative()
    {
        return false;
    }
    agricultural + vegetation <= total
}

/// `0 < planted <= agricultural_area`.
pub fn validate_planted_area(planted: Decimal, agricultural_area: Decimal) -> bool {
    planted > Decimal::ZERO && planted <= agricultural_area
}

/// Notas de produtividade/sustentabilidade/tecnologia ficam entre 0 e 100.
pub fn validate_score(score: i32) -> bool {
    (0..=100).contains(&score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Producer,
    Farm,
    Crop,
    Toast,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Producer => "prod",
            EntityKind::Farm => "farm",
            EntityKind::Crop => "crop",
            EntityKind::Toast => "toast",
        }
    }
}

/// ID com prefixo do tipo de entidade e sufixo UUID v4: `prod-6f1c...`.
pub fn generate_id(kind: EntityKind) -> String {
    format!("{}-{}", kind.prefix(), Uuid::new_v4().simple())
}

/// Gera um CPF válido (somente dígitos), usado pelo preenchimento automático de formulários.
pub fn generate_cpf() -> String {
    generate_cpf_with(&mut rand::thread_rng())
}

pub fn generate_cpf_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = random_base(rng, 9);
    let first = cpf_check_digit(&digits);
    digits.push(first);
    let second = cpf_check_digit(&digits);
    digits.push(second);
    digits_to_string(&digits)
}

/// Gera um CNPJ válido de matriz (filial `0001`).
pub fn generate_cnpj() -> String {
    generate_cnpj_with(&mut rand::thread_rng())
}

pub fn generate_cnpj_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = random_base(rng, 8);
    digits.extend_from_slice(&[0, 0, 0, 1]);
    let first = weighted_check_digit(&digits, &CNPJ_FIRST_WEIGHTS);
    digits.push(first);
    let second = weighted_check_digit(&digits, &CNPJ_SECOND_WEIGHTS);
    digits.push(second);
    digits_to_string(&digits)
}

fn random_base<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u32> {
    loop {
        let digits: Vec<u32> = (0..len).map(|_| rng.gen_range(0..10)).collect();
        if !is_repunit(&digits) {
            return digits;
        }
    }
}

fn to_digits(s: &str) -> Vec<u32> {
    s.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn digits_to_string(digits: &[u32]) -> String {
    digits
        .iter()
        .filter_map(|d| char::from_digit(*d, 10))
        .collect()
}

fn is_repunit(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

// Pesos decrescentes a partir de len + 1 (10..2 e 11..2)
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    mod11_digit(sum)
}

fn weighted_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    mod11_digit(sum)
}

fn mod11_digit(sum: u32) -> u32 {
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpf_formatted_or_not() {
        assert!(validate_document("529.982.247-25", DocumentType::Cpf));
        assert!(validate_document("52998224725", DocumentType::Cpf));
        assert!(validate_document("123.456.789-09", DocumentType::Cpf));
    }

    #[test]
    fn rejects_cpf_with_wrong_check_digits() {
        assert!(!validate_document("52998224724", DocumentType::Cpf));
        assert!(!validate_document("12345678901", DocumentType::Cpf));
    }

    #[test]
    fn rejects_repunits_and_wrong_lengths() {
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            let cnpj = d.to_string().repeat(14);
            assert!(!validate_document(&cpf, DocumentType::Cpf));
            assert!(!validate_document(&cnpj, DocumentType::Cnpj));
        }
        assert!(!validate_document("5299822472", DocumentType::Cpf));
        assert!(!validate_document("529982247250", DocumentType::Cpf));
        assert!(!validate_document("", DocumentType::Cnpj));
        // CNPJ válido não passa como CPF
        assert!(!validate_document("11222333000181", DocumentType::Cpf));
    }

    #[test]
    fn accepts_valid_cnpj() {
        assert!(validate_document("11.222.333/0001-81", DocumentType::Cnpj));
        assert!(validate_document("12345678000195", DocumentType::Cnpj));
        assert!(!validate_document("11222333000182", DocumentType::Cnpj));
    }

    #[test]
    fn generated_documents_are_valid() {
        for _ in 0..200 {
            let cpf = generate_cpf();
            let cnpj = generate_cnpj();
            assert!(validate_document(&cpf, DocumentType::Cpf), "cpf {cpf}");
            assert!(validate_document(&cnpj, DocumentType::Cnpj), "cnpj {cnpj}");
        }
    }

    #[test]
    fn formats_documents() {
        assert_eq!(format_document("52998224725", DocumentType::Cpf), "529.982.247-25");
        assert_eq!(
            format_document("11222333000181", DocumentType::Cnpj),
            "11.222.333/0001-81"
        );
        assert_eq!(format_document("123", DocumentType::Cpf), "123");
    }

    #[test]
    fn detects_type_by_length() {
        assert_eq!(detect_document_type("529.982.247-25"), Some(DocumentType::Cpf));
        assert_eq!(detect_document_type("11.222.333/0001-81"), Some(DocumentType::Cnpj));
        assert_eq!(detect_document_type("123"), None);
    }

    #[test]
    fn farm_area_invariant() {
        let d = |v: i64| Decimal::from(v);
        assert!(validate_farm_areas(d(100), d(60), d(40)));
        assert!(validate_farm_areas(d(100), d(0), d(0)));
        assert!(!validate_farm_areas(d(100), d(60), d(41)));
        assert!(!validate_farm_areas(d(100), d(-1), d(10)));
        assert!(!validate_farm_areas(d(-100), d(0), d(0)));
    }

    #[test]
    fn planted_area_ceiling() {
        let d = |v: i64| Decimal::from(v);
        assert!(validate_planted_area(d(50), d(50)));
        assert!(!validate_planted_area(d(0), d(50)));
        assert!(!validate_planted_area(d(51), d(50)));
    }

    #[test]
    fn ids_carry_entity_prefix() {
        let a = generate_id(EntityKind::Producer);
        let b = generate_id(EntityKind::Producer);
        assert!(a.starts_with("prod-"));
        assert_ne!(a, b);
        assert!(generate_id(EntityKind::Crop).starts_with("crop-"));
    }
}
