use super::model::{self, InputTransactionFormDto};
use crate::shared::config::app_config;
use crate::shared::date_utils::today;
use contracts::domain::a025_input_transaction::{
    AdditionalFee, CommissionBreakdown, InputTransactionDto, InputTransactionError,
    PaymentDestination, ServiceRef,
};
use leptos::prelude::*;
use std::rc::Rc;

/// ViewModel для диалога входящей транзакции
#[derive(Clone, Copy)]
pub struct InputTransactionDetailsVm {
    pub form: RwSignal<InputTransactionFormDto>,
    pub error: RwSignal<Option<String>>,
    pub services: RwSignal<Vec<ServiceRef>>,
    pub destinations: RwSignal<Vec<PaymentDestination>>,
    /// Доп. комиссия за срок; None пока сервер не ответил
    pub additional_fee: RwSignal<Option<AdditionalFee>>,
    pub is_loading: RwSignal<bool>,
    pub is_saving: RwSignal<bool>,
    pub is_uploading: RwSignal<bool>,
    edit_mode: bool,
}

impl InputTransactionDetailsVm {
    pub fn new(id: Option<String>) -> Self {
        let config = app_config();
        let vm = Self {
            form: RwSignal::new(InputTransactionFormDto::new(
                today(),
                config.form.default_commission_mode,
            )),
            error: RwSignal::new(None),
            services: RwSignal::new(Vec::new()),
            destinations: RwSignal::new(Vec::new()),
            additional_fee: RwSignal::new(None),
            is_loading: RwSignal::new(false),
            is_saving: RwSignal::new(false),
            is_uploading: RwSignal::new(false),
            edit_mode: id.is_some(),
        };

        vm.load_references();
        if let Some(id) = id {
            vm.load(id);
        }
        vm.watch_elapsed_days();

        vm
    }

    /// Режим редактирования: диалог открыт для существующей записи
    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn is_busy(&self) -> bool {
        self.is_saving.get() || self.is_uploading.get()
    }

    /// Разбор и валидация формы: готовый DTO или первая ошибка
    pub fn validate(&self) -> Result<InputTransactionDto, InputTransactionError> {
        let dto = self.form.with(|f| f.to_dto())?;
        dto.validate()?;
        Ok(dto)
    }

    pub fn selected_service(&self) -> Option<ServiceRef> {
        let service_id = self.form.with(|f| f.service_id.clone());
        self.services
            .with(|services| ServiceRef::find(services, &service_id).cloned())
    }

    pub fn base_percent(&self) -> f64 {
        self.selected_service()
            .map(|s| s.base_commission_percent)
            .unwrap_or(0.0)
    }

    pub fn additional_percent(&self) -> f64 {
        self.additional_fee
            .with(|fee| fee.map(|f| f.percent).unwrap_or(0.0))
    }

    pub fn elapsed_days(&self) -> i64 {
        self.form.with(|f| f.elapsed_days(today()))
    }

    /// Доп. комиссия получена именно для текущего числа дней
    pub fn additional_fee_is_current(&self) -> bool {
        self.additional_fee.with(|fee| fee.map(|f| f.days)) == Some(self.elapsed_days())
    }

    /// Производные значения для блока итогов
    pub fn breakdown(&self) -> CommissionBreakdown {
        let base_percent = self.base_percent();
        let additional_percent = self.additional_percent();
        self.form
            .with(|f| f.commission_input(base_percent, additional_percent).calculate())
    }

    /// DTO для отправки: форма валидна, услуга и доп. комиссия актуальны
    pub fn prepare_save(&self) -> Result<InputTransactionDto, String> {
        let dto = self.validate().map_err(|e| e.to_string())?;

        if self.selected_service().is_none() {
            return Err(if self.services.with(|s| s.is_empty()) {
                "Список услуг недоступен, комиссию рассчитать нельзя".to_string()
            } else {
                "Выбранная услуга не найдена в справочнике".to_string()
            });
        }
        if !self.additional_fee_is_current() {
            return Err("Доп. комиссия ещё рассчитывается, повторите сохранение".to_string());
        }

        Ok(dto.with_derived(&self.breakdown(), self.elapsed_days()))
    }

    /// Загрузить транзакцию с сервера
    pub fn load(&self, id: String) {
        let form = self.form;
        let error = self.error;
        let is_loading = self.is_loading;
        is_loading.set(true);

        wasm_bindgen_futures::spawn_local(async move {
            match model::fetch_by_id(&id).await {
                Ok(transaction) => form.set(InputTransactionFormDto::from(transaction)),
                Err(e) => error.set(Some(format!("Ошибка загрузки: {}", e))),
            }
            is_loading.set(false);
        });
    }

    /// Справочники услуг и реквизитов; при ошибке остаются пустыми
    pub fn load_references(&self) {
        let services = self.services;
        let destinations = self.destinations;

        wasm_bindgen_futures::spawn_local(async move {
            match model::fetch_services().await {
                Ok(list) => services.set(list),
                Err(e) => {
                    log::warn!("Не удалось загрузить услуги: {}", e);
                    services.set(Vec::new());
                }
            }
            match model::fetch_payment_destinations().await {
                Ok(list) => destinations.set(list),
                Err(e) => {
                    log::warn!("Не удалось загрузить реквизиты выплаты: {}", e);
                    destinations.set(Vec::new());
                }
            }
        });
    }

    // доп. комиссия перезапрашивается только при смене числа дней
    fn watch_elapsed_days(&self) {
        let vm = *self;
        Effect::new(move |prev: Option<i64>| {
            let days = vm.elapsed_days();
            if prev != Some(days) {
                vm.refresh_additional_fee(days);
            }
            days
        });
    }

    /// Запросить доп. комиссию за `days` дней; при ошибке 0 %
    pub fn refresh_additional_fee(&self, days: i64) {
        let vm = *self;

        wasm_bindgen_futures::spawn_local(async move {
            let fee = match model::fetch_additional_fee(days).await {
                Ok(fee) => AdditionalFee { days, ..fee },
                Err(e) => {
                    log::warn!("Не удалось получить доп. комиссию за {} дн.: {}", days, e);
                    AdditionalFee { days, percent: 0.0 }
                }
            };
            vm.apply_additional_fee(fee);
        });
    }

    /// Принять ответ по доп. комиссии, если он относится к текущему числу дней.
    ///
    /// Возвращает false для устаревшего ответа или закрытого диалога.
    pub fn apply_additional_fee(&self, fee: AdditionalFee) -> bool {
        let current_days = self.form.try_with_untracked(|f| f.elapsed_days(today()));
        if current_days != Some(fee.days) {
            return false;
        }
        self.additional_fee.try_set(Some(fee)).is_none()
    }

    pub fn select_service(&self, service_id: String) {
        self.form.update(|f| f.service_id = service_id);
    }

    /// Загрузить файл-подтверждение и запомнить его в форме
    pub fn upload_evidence_command(&self, file: web_sys::File) {
        let form_config = &app_config().form;
        if file.size() > form_config.max_evidence_size_bytes() {
            self.error.set(Some(format!(
                "Файл слишком большой: допускается не более {} МБ",
                form_config.max_evidence_size_mb
            )));
            return;
        }

        self.is_uploading.set(true);
        self.error.set(None);

        let form = self.form;
        let error = self.error;
        let is_uploading = self.is_uploading;

        wasm_bindgen_futures::spawn_local(async move {
            match model::upload_evidence(file).await {
                Ok(evidence) => {
                    log::info!(
                        "Evidence uploaded: {} ({}, {} bytes)",
                        evidence.file_name,
                        evidence.file_id,
                        evidence.size_bytes.unwrap_or_default()
                    );
                    form.update(|f| f.attach_evidence(evidence));
                }
                Err(e) => error.set(Some(format!("Ошибка загрузки файла: {}", e))),
            }
            is_uploading.set(false);
        });
    }

    pub fn clear_evidence(&self) {
        self.form.update(|f| f.clear_evidence());
    }

    /// Сохранить данные на сервер
    pub fn save_command(&self, on_saved: Rc<dyn Fn(())>) {
        if self.is_saving.get_untracked() {
            return;
        }

        let dto = match self.prepare_save() {
            Ok(dto) => dto,
            Err(e) => {
                self.error.set(Some(e));
                return;
            }
        };

        self.is_saving.set(true);
        self.error.set(None);

        let error = self.error;
        let is_saving = self.is_saving;

        wasm_bindgen_futures::spawn_local(async move {
            match model::save_form(&dto).await {
                Ok(()) => {
                    log::info!(
                        "Input transaction saved: amount={}, commission={}, net={}",
                        dto.amount,
                        dto.commission_total,
                        dto.net_amount
                    );
                    is_saving.set(false);
                    (on_saved)(());
                }
                Err(e) => {
                    error.set(Some(format!("Ошибка сохранения: {}", e)));
                    is_saving.set(false);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a025_input_transaction::CommissionMode;
    use std::cell::Cell;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service() -> ServiceRef {
        ServiceRef {
            id: "svc-1".into(),
            code: "S1".into(),
            description: "Эквайринг".into(),
            base_commission_percent: 2.0,
            is_active: true,
        }
    }

    // 10 000 через svc-1, операция 01.03, выплата 11.03 (10 дней)
    fn vm_with(fee: Option<AdditionalFee>, services: Vec<ServiceRef>) -> InputTransactionDetailsVm {
        let mut form = InputTransactionFormDto::new(date("2025-03-01"), CommissionMode::OnTop);
        form.service_id = "svc-1".into();
        form.amount = "10000".into();
        form.payment_date = "2025-03-11".into();
        form.payment_destination_id = "dst-1".into();

        InputTransactionDetailsVm {
            form: RwSignal::new(form),
            error: RwSignal::new(None),
            services: RwSignal::new(services),
            destinations: RwSignal::new(Vec::new()),
            additional_fee: RwSignal::new(fee),
            is_loading: RwSignal::new(false),
            is_saving: RwSignal::new(false),
            is_uploading: RwSignal::new(false),
            edit_mode: false,
        }
    }

    fn fee(days: i64, percent: f64) -> Option<AdditionalFee> {
        Some(AdditionalFee { days, percent })
    }

    #[test]
    fn test_prepare_save_fills_derived_values() {
        let vm = vm_with(fee(10, 1.0), vec![service()]);
        let dto = vm.prepare_save().unwrap();
        assert_eq!(dto.elapsed_days, 10);
        assert_eq!(dto.commission_total, 300.0);
        assert_eq!(dto.net_amount, 9700.0);
    }

    #[test]
    fn test_prepare_save_rejects_fee_for_other_span() {
        let vm = vm_with(fee(0, 5.0), vec![service()]);
        assert_eq!(vm.elapsed_days(), 10);
        assert!(!vm.additional_fee_is_current());
        assert!(vm.prepare_save().is_err());

        let vm = vm_with(None, vec![service()]);
        assert!(vm.prepare_save().is_err());
    }

    #[test]
    fn test_prepare_save_requires_known_service() {
        let vm = vm_with(fee(10, 1.0), Vec::new());
        assert_eq!(
            vm.prepare_save().unwrap_err(),
            "Список услуг недоступен, комиссию рассчитать нельзя"
        );

        let mut other = service();
        other.id = "svc-2".into();
        let vm = vm_with(fee(10, 1.0), vec![other]);
        assert!(vm.prepare_save().is_err());
    }

    #[test]
    fn test_save_aborts_on_invalid_form() {
        let vm = vm_with(fee(10, 1.0), vec![service()]);
        vm.form.update(|f| f.amount = String::new());

        let saved = Rc::new(Cell::new(false));
        let on_saved: Rc<dyn Fn(())> = {
            let saved = saved.clone();
            Rc::new(move |_: ()| saved.set(true))
        };
        vm.save_command(on_saved);

        assert!(vm.error.get_untracked().is_some());
        assert!(!vm.is_saving.get_untracked());
        assert!(!saved.get());
    }

    #[test]
    fn test_save_aborts_on_stale_fee() {
        let vm = vm_with(fee(3, 1.0), vec![service()]);
        vm.save_command(Rc::new(|_: ()| {}));

        assert_eq!(
            vm.error.get_untracked().as_deref(),
            Some("Доп. комиссия ещё рассчитывается, повторите сохранение")
        );
        assert!(!vm.is_saving.get_untracked());
    }

    #[test]
    fn test_stale_fee_response_is_dropped() {
        let vm = vm_with(None, vec![service()]);

        assert!(!vm.apply_additional_fee(AdditionalFee { days: 3, percent: 9.0 }));
        assert_eq!(vm.additional_fee.get_untracked(), None);

        assert!(vm.apply_additional_fee(AdditionalFee { days: 10, percent: 1.5 }));
        assert_eq!(vm.additional_percent(), 1.5);

        vm.form.update(|f| f.payment_date = "2025-03-04".into());
        assert!(!vm.additional_fee_is_current());
        assert!(!vm.apply_additional_fee(AdditionalFee { days: 10, percent: 2.0 }));
        assert_eq!(vm.additional_percent(), 1.5);
    }

    #[test]
    fn test_edit_mode_follows_opened_id() {
        let mut vm = vm_with(None, vec![service()]);
        assert!(!vm.is_edit_mode());
        vm.edit_mode = true;
        assert!(vm.form.with_untracked(|f| f.id.is_none()));
        assert!(vm.is_edit_mode());
    }
}
