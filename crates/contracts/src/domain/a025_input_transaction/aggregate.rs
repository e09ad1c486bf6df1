use super::commission::{CommissionBreakdown, CommissionInput, CommissionMode};
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор входящей транзакции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputTransactionId(pub Uuid);

impl InputTransactionId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for InputTransactionId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s.trim())
            .map(InputTransactionId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputTransactionError {
    #[error("Услуга должна быть выбрана")]
    ServiceRequired,

    #[error("Сумма должна быть больше нуля")]
    AmountNotPositive,

    #[error("Процент комиссии должен быть от 0 до 100 (указано {0})")]
    CommissionPercentOutOfRange(f64),

    #[error("Дополнительная комиссия не может быть отрицательной")]
    AdditionalCommissionNegative,

    #[error("Дата операции обязательна")]
    OperationDateRequired,

    #[error("Дата выплаты не может быть раньше даты операции")]
    PaymentBeforeOperation,

    #[error("Назначение выплаты должно быть выбрано")]
    PaymentDestinationRequired,

    #[error("Некорректное значение поля «{field}»: {value}")]
    InvalidField { field: &'static str, value: String },
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Входящая транзакция: поступление денег через услугу с удержанием комиссий
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTransaction {
    #[serde(flatten)]
    pub base: BaseAggregate<InputTransactionId>,

    pub service_id: String,
    pub amount: f64,
    pub commission_percent_override: Option<f64>,
    pub additional_commission_override: Option<f64>,
    #[serde(default)]
    pub commission_mode: CommissionMode,
    pub operation_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub payment_destination_id: String,
    pub evidence_file_id: Option<String>,
    pub evidence_file_name: Option<String>,

    // Значения, рассчитанные формой на момент сохранения
    #[serde(default)]
    pub commission_total: f64,
    #[serde(default)]
    pub net_amount: f64,
    #[serde(default)]
    pub elapsed_days: i64,
}

impl InputTransaction {
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn has_evidence(&self) -> bool {
        self.evidence_file_id
            .as_ref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false)
    }
}

impl AggregateRoot for InputTransaction {
    type Id = InputTransactionId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a025"
    }

    fn collection_name() -> &'static str {
        "input-transaction"
    }

    fn element_name() -> &'static str {
        "Входящая транзакция"
    }

    fn list_name() -> &'static str {
        "Входящие транзакции"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления входящей транзакции (id = None -> создание)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTransactionDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,

    pub service_id: String,
    pub amount: f64,
    pub commission_percent_override: Option<f64>,
    pub additional_commission_override: Option<f64>,
    pub commission_mode: CommissionMode,
    pub operation_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub payment_destination_id: String,
    pub evidence_file_id: Option<String>,
    pub evidence_file_name: Option<String>,

    pub commission_total: f64,
    pub net_amount: f64,
    pub elapsed_days: i64,
}

impl InputTransactionDto {
    /// Валидация данных перед отправкой на сервер
    pub fn validate(&self) -> Result<(), InputTransactionError> {
        if self.service_id.trim().is_empty() {
            return Err(InputTransactionError::ServiceRequired);
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(InputTransactionError::AmountNotPositive);
        }
        if let Some(p) = self.commission_percent_override {
            if !p.is_finite() || !(0.0..=100.0).contains(&p) {
                return Err(InputTransactionError::CommissionPercentOutOfRange(p));
            }
        }
        if let Some(v) = self.additional_commission_override {
            if !v.is_finite() || v < 0.0 {
                return Err(InputTransactionError::AdditionalCommissionNegative);
            }
        }
        if let Some(payment_date) = self.payment_date {
            if payment_date < self.operation_date {
                return Err(InputTransactionError::PaymentBeforeOperation);
            }
        }
        if self.payment_destination_id.trim().is_empty() {
            return Err(InputTransactionError::PaymentDestinationRequired);
        }
        Ok(())
    }

    /// Входные данные расчёта комиссий по значениям справочников
    pub fn commission_input(&self, base_percent: f64, additional_percent: f64) -> CommissionInput {
        CommissionInput {
            amount: self.amount,
            base_percent,
            override_percent: self.commission_percent_override,
            additional_percent,
            additional_override_amount: self.additional_commission_override,
            mode: self.commission_mode,
        }
    }

    /// Заполнить сохраняемые производные значения
    pub fn with_derived(mut self, breakdown: &CommissionBreakdown, elapsed_days: i64) -> Self {
        self.commission_total = breakdown.total_commission;
        self.net_amount = breakdown.net_amount;
        self.elapsed_days = elapsed_days;
        self
    }
}

impl From<InputTransaction> for InputTransactionDto {
    fn from(t: InputTransaction) -> Self {
        Self {
            id: Some(t.base.id.as_string()),
            code: Some(t.base.code),
            description: t.base.description,
            comment: t.base.comment,
            service_id: t.service_id,
            amount: t.amount,
            commission_percent_override: t.commission_percent_override,
            additional_commission_override: t.additional_commission_override,
            commission_mode: t.commission_mode,
            operation_date: t.operation_date,
            payment_date: t.payment_date,
            payment_destination_id: t.payment_destination_id,
            evidence_file_id: t.evidence_file_id,
            evidence_file_name: t.evidence_file_name,
            commission_total: t.commission_total,
            net_amount: t.net_amount,
            elapsed_days: t.elapsed_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn valid_dto() -> InputTransactionDto {
        InputTransactionDto {
            id: None,
            code: None,
            description: "Поступление по договору 17".into(),
            comment: None,
            service_id: "svc-1".into(),
            amount: 10000.0,
            commission_percent_override: None,
            additional_commission_override: None,
            commission_mode: CommissionMode::OnTop,
            operation_date: date("2025-03-01"),
            payment_date: Some(date("2025-03-11")),
            payment_destination_id: "dst-1".into(),
            evidence_file_id: None,
            evidence_file_name: None,
            commission_total: 0.0,
            net_amount: 0.0,
            elapsed_days: 0,
        }
    }

    #[test]
    fn test_valid_dto_passes() {
        assert_eq!(valid_dto().validate(), Ok(()));
    }

    #[test]
    fn test_validation_errors() {
        let mut dto = valid_dto();
        dto.service_id = "  ".into();
        assert_eq!(dto.validate(), Err(InputTransactionError::ServiceRequired));

        let mut dto = valid_dto();
        dto.amount = 0.0;
        assert_eq!(dto.validate(), Err(InputTransactionError::AmountNotPositive));

        let mut dto = valid_dto();
        dto.commission_percent_override = Some(120.0);
        assert_eq!(
            dto.validate(),
            Err(InputTransactionError::CommissionPercentOutOfRange(120.0))
        );

        let mut dto = valid_dto();
        dto.additional_commission_override = Some(-1.0);
        assert_eq!(dto.validate(), Err(InputTransactionError::AdditionalCommissionNegative));

        let mut dto = valid_dto();
        dto.payment_date = Some(date("2025-02-27"));
        assert_eq!(dto.validate(), Err(InputTransactionError::PaymentBeforeOperation));

        let mut dto = valid_dto();
        dto.payment_destination_id = String::new();
        assert_eq!(dto.validate(), Err(InputTransactionError::PaymentDestinationRequired));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            InputTransactionError::CommissionPercentOutOfRange(150.0).to_string(),
            "Процент комиссии должен быть от 0 до 100 (указано 150)"
        );
        assert_eq!(
            InputTransactionError::InvalidField {
                field: "Сумма",
                value: "abc".into()
            }
            .to_string(),
            "Некорректное значение поля «Сумма»: abc"
        );
    }

    #[test]
    fn test_with_derived() {
        let dto = valid_dto();
        let breakdown = dto.commission_input(2.0, 0.5).calculate();
        let dto = dto.with_derived(&breakdown, 10);
        assert_eq!(dto.commission_total, 250.0);
        assert_eq!(dto.net_amount, 9750.0);
        assert_eq!(dto.elapsed_days, 10);
    }

    #[test]
    fn test_dto_json_is_camel_case() {
        let json = serde_json::to_value(valid_dto()).unwrap();
        assert_eq!(json["serviceId"], "svc-1");
        assert_eq!(json["operationDate"], "2025-03-01");
        assert_eq!(json["commissionMode"], "on_top");
        assert!(json["paymentDestinationId"].is_string());
    }

    #[test]
    fn test_aggregate_to_dto() {
        let id = InputTransactionId::new_v4();
        let json = serde_json::json!({
            "id": id.value(),
            "code": "IT-0001",
            "description": "Оплата",
            "comment": null,
            "metadata": {
                "created_at": "2025-03-01T10:00:00Z",
                "updated_at": "2025-03-01T10:00:00Z"
            },
            "serviceId": "svc-1",
            "amount": 500.0,
            "commissionPercentOverride": 1.0,
            "additionalCommissionOverride": null,
            "operationDate": "2025-03-01",
            "paymentDate": null,
            "paymentDestinationId": "dst-1",
            "evidenceFileId": "f-1",
            "evidenceFileName": "check.pdf"
        });
        let aggregate: InputTransaction = serde_json::from_value(json).unwrap();
        assert!(aggregate.has_evidence());
        assert_eq!(aggregate.commission_mode, CommissionMode::OnTop);
        assert_eq!(InputTransaction::api_path(), "/api/a025/input-transaction");
        assert_eq!(InputTransaction::element_name(), "Входящая транзакция");
        assert_eq!(InputTransaction::list_name(), "Входящие транзакции");

        let dto = InputTransactionDto::from(aggregate);
        assert_eq!(dto.id, Some(id.as_string()));
        assert_eq!(dto.code.as_deref(), Some("IT-0001"));
        assert_eq!(dto.commission_percent_override, Some(1.0));
        assert_eq!(dto.payment_date, None);
    }
}
