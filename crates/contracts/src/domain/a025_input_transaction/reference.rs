//! Справочные данные, которые форма входящей транзакции получает с бэкенда.

use serde::{Deserialize, Serialize};

/// Услуга (канал поступления денег) с базовой комиссией
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub description: String,
    /// Базовая комиссия услуги, %
    #[serde(default)]
    pub base_commission_percent: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl ServiceRef {
    pub fn find<'a>(services: &'a [ServiceRef], id: &str) -> Option<&'a ServiceRef> {
        services.iter().find(|s| s.id == id)
    }

    pub fn display_name(&self) -> String {
        if self.code.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.code)
        }
    }
}

/// Счёт/реквизиты, куда выплачиваются деньги по транзакции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDestination {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub account_number: String,
    pub bank_name: Option<String>,
}

impl PaymentDestination {
    /// Номер счёта с маской: видны только последние 4 символа
    pub fn masked_account(&self) -> String {
        let chars: Vec<char> = self.account_number.chars().collect();
        if chars.len() <= 4 {
            return self.account_number.clone();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }

    pub fn display_name(&self) -> String {
        let mut parts = vec![self.description.clone()];
        if let Some(bank) = self.bank_name.as_ref().filter(|b| !b.trim().is_empty()) {
            parts.push(bank.clone());
        }
        if !self.account_number.is_empty() {
            parts.push(self.masked_account());
        }
        parts.join(" • ")
    }
}

/// Дополнительная комиссия, зависящая от количества дней до выплаты
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalFee {
    pub days: i64,
    pub percent: f64,
}

/// Ответ бэкенда на загрузку файла-подтверждения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceFile {
    pub file_id: String,
    pub file_name: String,
    pub url: Option<String>,
    pub size_bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(account: &str, bank: Option<&str>) -> PaymentDestination {
        PaymentDestination {
            id: "d1".into(),
            description: "Основной счёт".into(),
            account_number: account.into(),
            bank_name: bank.map(Into::into),
        }
    }

    #[test]
    fn test_masked_account() {
        assert_eq!(destination("40702810900000012345", None).masked_account(), "****2345");
        assert_eq!(destination("123", None).masked_account(), "123");
    }

    #[test]
    fn test_destination_display_name() {
        assert_eq!(
            destination("40702810900000012345", Some("Сбербанк")).display_name(),
            "Основной счёт • Сбербанк • ****2345"
        );
        assert_eq!(destination("", Some("  ")).display_name(), "Основной счёт");
    }

    #[test]
    fn test_service_deserialize_defaults() {
        let json = r#"{"id":"s1","description":"Эквайринг","baseCommissionPercent":2.5}"#;
        let service: ServiceRef = serde_json::from_str(json).unwrap();
        assert!(service.is_active);
        assert_eq!(service.base_commission_percent, 2.5);
        assert_eq!(service.display_name(), "Эквайринг");
    }

    #[test]
    fn test_find_service() {
        let services = vec![
            ServiceRef {
                id: "a".into(),
                code: "ACQ".into(),
                description: "Эквайринг".into(),
                base_commission_percent: 2.0,
                is_active: true,
            },
            ServiceRef {
                id: "b".into(),
                code: "SBP".into(),
                description: "СБП".into(),
                base_commission_percent: 0.7,
                is_active: true,
            },
        ];
        assert_eq!(ServiceRef::find(&services, "b").map(|s| s.code.as_str()), Some("SBP"));
        assert!(ServiceRef::find(&services, "c").is_none());
    }
}
