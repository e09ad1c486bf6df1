use crate::shared::api_utils::api_url;
use crate::shared::date_utils::{parse_iso_date, to_iso_date};
use crate::shared::number_format::parse_decimal;
use chrono::NaiveDate;
use contracts::domain::a025_input_transaction::commission::elapsed_days;
use contracts::domain::a025_input_transaction::{
    AdditionalFee, CommissionInput, CommissionMode, EvidenceFile, InputTransaction,
    InputTransactionDto, InputTransactionError, PaymentDestination, ServiceRef,
};
use contracts::domain::common::AggregateRoot;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

// ============================================================================
// API
// ============================================================================

fn reference_url(segment: &str) -> String {
    api_url(&format!("/api/{}/{}", InputTransaction::aggregate_index(), segment))
}

pub(crate) async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = Request::get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| format!("Ошибка сети: {}", e))?;
    if response.status() == 404 {
        return Err("Not found".to_string());
    }
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| format!("Ошибка парсинга: {}", e))
}

/// Загрузить транзакцию по ID
pub async fn fetch_by_id(id: &str) -> Result<InputTransaction, String> {
    let url = api_url(&format!(
        "{}/{}",
        InputTransaction::api_path(),
        urlencoding::encode(id.trim())
    ));
    get_json(&url).await
}

/// Сохранить транзакцию (создать или обновить)
pub async fn save_form(dto: &InputTransactionDto) -> Result<(), String> {
    let url = api_url(&InputTransaction::api_path());
    let response = Request::post(&url)
        .header("Accept", "application/json")
        .json(dto)
        .map_err(|e| format!("{e}"))?
        .send()
        .await
        .map_err(|e| format!("Ошибка сети: {}", e))?;
    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(if body.trim().is_empty() {
            format!("HTTP {}", response.status())
        } else {
            format!("HTTP {}: {}", response.status(), body.trim())
        });
    }
    Ok(())
}

pub async fn fetch_services() -> Result<Vec<ServiceRef>, String> {
    get_json(&reference_url("services")).await
}

pub async fn fetch_payment_destinations() -> Result<Vec<PaymentDestination>, String> {
    get_json(&reference_url("payment-destinations")).await
}

/// Дополнительная комиссия за количество дней до выплаты
pub async fn fetch_additional_fee(days: i64) -> Result<AdditionalFee, String> {
    get_json(&format!("{}?days={}", reference_url("additional-fee"), days)).await
}

/// Ссылка для просмотра загруженного файла-подтверждения
pub fn evidence_url(file_id: &str) -> String {
    api_url(&format!(
        "{}/evidence/{}",
        InputTransaction::api_path(),
        urlencoding::encode(file_id)
    ))
}

/// Загрузить файл-подтверждение (multipart, поле `file`)
pub async fn upload_evidence(file: web_sys::File) -> Result<EvidenceFile, String> {
    use wasm_bindgen::JsCast;
    use web_sys::{FormData, Request, RequestInit, RequestMode, Response};

    let form_data = FormData::new().map_err(|e| format!("{e:?}"))?;
    form_data
        .append_with_blob_and_filename("file", &file, &file.name())
        .map_err(|e| format!("{e:?}"))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&form_data);

    let url = api_url(&format!("{}/evidence", InputTransaction::api_path()));
    let request = Request::new_with_str_and_init(&url, &opts).map_err(|e| format!("{e:?}"))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|e| format!("{e:?}"))?;

    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let resp_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("{e:?}"))?;
    let resp: Response = resp_value.dyn_into().map_err(|e| format!("{e:?}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    let text = wasm_bindgen_futures::JsFuture::from(resp.text().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("{e:?}"))?;
    let text: String = text.as_string().ok_or_else(|| "bad text".to_string())?;
    serde_json::from_str(&text).map_err(|e| format!("{e}"))
}

// ============================================================================
// Form DTO
// ============================================================================

/// Состояние формы: числа и даты хранятся так, как их ввёл пользователь
#[derive(Clone, Debug, PartialEq)]
pub struct InputTransactionFormDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: String,
    pub service_id: String,
    pub amount: String,
    pub commission_percent_override: String,
    pub additional_commission_override: String,
    pub commission_mode: CommissionMode,
    /// yyyy-mm-dd
    pub operation_date: String,
    /// yyyy-mm-dd, пусто если выплаты ещё не было
    pub payment_date: String,
    pub payment_destination_id: String,
    pub evidence_file_id: Option<String>,
    pub evidence_file_name: Option<String>,
    /// Ссылка от сервера на только что загруженный файл
    pub evidence_link: Option<String>,
}

fn optional_decimal(
    value: &str,
    field: &'static str,
) -> Result<Option<f64>, InputTransactionError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(value)
        .map(Some)
        .ok_or_else(|| InputTransactionError::InvalidField {
            field,
            value: value.trim().to_string(),
        })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn format_number_input(value: f64) -> String {
    value.to_string()
}

impl InputTransactionFormDto {
    pub fn new(today: NaiveDate, commission_mode: CommissionMode) -> Self {
        Self {
            id: None,
            code: None,
            description: String::new(),
            comment: String::new(),
            service_id: String::new(),
            amount: String::new(),
            commission_percent_override: String::new(),
            additional_commission_override: String::new(),
            commission_mode,
            operation_date: to_iso_date(today),
            payment_date: String::new(),
            payment_destination_id: String::new(),
            evidence_file_id: None,
            evidence_file_name: None,
            evidence_link: None,
        }
    }

    pub fn amount_value(&self) -> f64 {
        parse_decimal(&self.amount).unwrap_or(0.0)
    }

    pub fn elapsed_days(&self, today: NaiveDate) -> i64 {
        match parse_iso_date(&self.operation_date) {
            Some(operation_date) => {
                elapsed_days(operation_date, parse_iso_date(&self.payment_date), today)
            }
            None => 0,
        }
    }

    /// Входные данные расчёта; нераспознанные поля считаются пустыми
    pub fn commission_input(&self, base_percent: f64, additional_percent: f64) -> CommissionInput {
        CommissionInput {
            amount: self.amount_value(),
            base_percent,
            override_percent: parse_decimal(&self.commission_percent_override),
            additional_percent,
            additional_override_amount: parse_decimal(&self.additional_commission_override),
            mode: self.commission_mode,
        }
    }

    pub fn attach_evidence(&mut self, evidence: EvidenceFile) {
        self.evidence_link = evidence.url.filter(|url| !url.trim().is_empty());
        self.evidence_file_id = Some(evidence.file_id);
        self.evidence_file_name = Some(evidence.file_name);
    }

    pub fn clear_evidence(&mut self) {
        self.evidence_file_id = None;
        self.evidence_file_name = None;
        self.evidence_link = None;
    }

    /// Куда ведёт ссылка на файл: адрес от сервера, иначе стандартный путь по id
    pub fn evidence_href(&self) -> Option<String> {
        let file_id = self.evidence_file_id.as_deref()?;
        Some(
            self.evidence_link
                .clone()
                .unwrap_or_else(|| evidence_url(file_id)),
        )
    }

    /// Строгое преобразование в DTO для сохранения
    pub fn to_dto(&self) -> Result<InputTransactionDto, InputTransactionError> {
        let amount = if self.amount.trim().is_empty() {
            return Err(InputTransactionError::AmountNotPositive);
        } else {
            parse_decimal(&self.amount).ok_or_else(|| InputTransactionError::InvalidField {
                field: "Сумма",
                value: self.amount.trim().to_string(),
            })?
        };

        let operation_date = if self.operation_date.trim().is_empty() {
            return Err(InputTransactionError::OperationDateRequired);
        } else {
            parse_iso_date(&self.operation_date).ok_or_else(|| {
                InputTransactionError::InvalidField {
                    field: "Дата операции",
                    value: self.operation_date.clone(),
                }
            })?
        };

        let payment_date = if self.payment_date.trim().is_empty() {
            None
        } else {
            Some(parse_iso_date(&self.payment_date).ok_or_else(|| {
                InputTransactionError::InvalidField {
                    field: "Дата выплаты",
                    value: self.payment_date.clone(),
                }
            })?)
        };

        Ok(InputTransactionDto {
            id: self.id.clone(),
            code: self.code.clone(),
            description: self.description.trim().to_string(),
            comment: non_empty(&self.comment),
            service_id: self.service_id.clone(),
            amount,
            commission_percent_override: optional_decimal(
                &self.commission_percent_override,
                "Комиссия оператора, %",
            )?,
            additional_commission_override: optional_decimal(
                &self.additional_commission_override,
                "Доп. комиссия, сумма",
            )?,
            commission_mode: self.commission_mode,
            operation_date,
            payment_date,
            payment_destination_id: self.payment_destination_id.clone(),
            evidence_file_id: self.evidence_file_id.clone(),
            evidence_file_name: self.evidence_file_name.clone(),
            commission_total: 0.0,
            net_amount: 0.0,
            elapsed_days: 0,
        })
    }
}

impl From<InputTransaction> for InputTransactionFormDto {
    fn from(t: InputTransaction) -> Self {
        let dto = InputTransactionDto::from(t);
        Self {
            id: dto.id,
            code: dto.code,
            description: dto.description,
            comment: dto.comment.unwrap_or_default(),
            service_id: dto.service_id,
            amount: format_number_input(dto.amount),
            commission_percent_override: dto
                .commission_percent_override
                .map(format_number_input)
                .unwrap_or_default(),
            additional_commission_override: dto
                .additional_commission_override
                .map(format_number_input)
                .unwrap_or_default(),
            commission_mode: dto.commission_mode,
            operation_date: to_iso_date(dto.operation_date),
            payment_date: dto.payment_date.map(to_iso_date).unwrap_or_default(),
            payment_destination_id: dto.payment_destination_id,
            evidence_file_id: dto.evidence_file_id,
            evidence_file_name: dto.evidence_file_name,
            evidence_link: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn filled_form() -> InputTransactionFormDto {
        let mut form = InputTransactionFormDto::new(date("2025-03-01"), CommissionMode::OnTop);
        form.description = "  Оплата по счёту 12 ".into();
        form.service_id = "svc-1".into();
        form.amount = "10 000,00".into();
        form.payment_date = "2025-03-11".into();
        form.payment_destination_id = "dst-1".into();
        form
    }

    #[test]
    fn test_new_form_defaults() {
        let form = InputTransactionFormDto::new(date("2025-03-01"), CommissionMode::Included);
        assert_eq!(form.operation_date, "2025-03-01");
        assert!(form.payment_date.is_empty());
        assert_eq!(form.commission_mode, CommissionMode::Included);
        assert_eq!(form.amount_value(), 0.0);
    }

    #[test]
    fn test_to_dto_parses_user_input() {
        let dto = filled_form().to_dto().unwrap();
        assert_eq!(dto.amount, 10000.0);
        assert_eq!(dto.description, "Оплата по счёту 12");
        assert_eq!(dto.comment, None);
        assert_eq!(dto.payment_date, Some(date("2025-03-11")));
        assert_eq!(dto.commission_percent_override, None);
        assert_eq!(dto.validate(), Ok(()));
    }

    #[test]
    fn test_to_dto_reports_bad_fields() {
        let mut form = filled_form();
        form.amount = String::new();
        assert_eq!(form.to_dto(), Err(InputTransactionError::AmountNotPositive));

        let mut form = filled_form();
        form.amount = "12abc".into();
        assert_eq!(
            form.to_dto(),
            Err(InputTransactionError::InvalidField {
                field: "Сумма",
                value: "12abc".into()
            })
        );

        let mut form = filled_form();
        form.commission_percent_override = "x".into();
        assert!(matches!(
            form.to_dto(),
            Err(InputTransactionError::InvalidField { field: "Комиссия оператора, %", .. })
        ));

        let mut form = filled_form();
        form.operation_date = String::new();
        assert_eq!(form.to_dto(), Err(InputTransactionError::OperationDateRequired));
    }

    #[test]
    fn test_elapsed_days_from_form() {
        let today = date("2025-03-20");
        let mut form = filled_form();
        assert_eq!(form.elapsed_days(today), 10);
        form.payment_date = String::new();
        assert_eq!(form.elapsed_days(today), 19);
        form.operation_date = "garbage".into();
        assert_eq!(form.elapsed_days(today), 0);
    }

    #[test]
    fn test_commission_input_is_lenient() {
        let mut form = filled_form();
        form.commission_percent_override = "1,5".into();
        form.additional_commission_override = "oops".into();
        let b = form.commission_input(3.0, 0.5).calculate();
        assert_eq!(b.effective_percent, 1.5);
        assert_eq!(b.commission_amount, 150.0);
        assert_eq!(b.additional_amount, 50.0);
        assert_eq!(b.net_amount, 9800.0);
    }

    #[test]
    fn test_attach_and_clear_evidence() {
        let mut form = filled_form();
        form.attach_evidence(EvidenceFile {
            file_id: "f-17".into(),
            file_name: "receipt.pdf".into(),
            url: Some("https://files.example.test/f-17".into()),
            size_bytes: Some(2048),
        });
        assert_eq!(form.evidence_file_id.as_deref(), Some("f-17"));
        assert_eq!(form.evidence_file_name.as_deref(), Some("receipt.pdf"));
        assert_eq!(
            form.evidence_href().as_deref(),
            Some("https://files.example.test/f-17")
        );
        assert_eq!(form.to_dto().unwrap().evidence_file_id.as_deref(), Some("f-17"));

        form.clear_evidence();
        assert_eq!(form.evidence_file_id, None);
        assert_eq!(form.evidence_link, None);
        assert_eq!(form.evidence_href(), None);
    }

    #[test]
    fn test_form_from_aggregate() {
        let json = serde_json::json!({
            "id": "6f1c8f8e-6a0e-4a57-9d61-3f0b1f2a9c11",
            "code": "IT-0007",
            "description": "Оплата",
            "comment": "срочно",
            "serviceId": "svc-2",
            "amount": 1500.5,
            "commissionPercentOverride": null,
            "additionalCommissionOverride": 12.0,
            "commissionMode": "included",
            "operationDate": "2025-01-10",
            "paymentDate": "2025-01-15",
            "paymentDestinationId": "dst-9",
            "evidenceFileId": null,
            "evidenceFileName": null
        });
        let aggregate: InputTransaction = serde_json::from_value(json).unwrap();
        let form = InputTransactionFormDto::from(aggregate);
        assert_eq!(form.id.as_deref(), Some("6f1c8f8e-6a0e-4a57-9d61-3f0b1f2a9c11"));
        assert_eq!(form.amount, "1500.5");
        assert_eq!(form.commission_percent_override, "");
        assert_eq!(form.additional_commission_override, "12");
        assert_eq!(form.commission_mode, CommissionMode::Included);
        assert_eq!(form.payment_date, "2025-01-15");
        assert_eq!(form.comment, "срочно");
    }
}
