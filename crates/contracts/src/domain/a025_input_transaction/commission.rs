//! Расчёт комиссий входящей транзакции
//!
//! Все функции чистые: на вход скаляры из формы и справочников,
//! на выход суммы для отображения и сохранения.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Способ перевода процента комиссии в сумму
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionMode {
    /// Комиссия начисляется сверху: `amount * p / 100`
    #[default]
    OnTop,
    /// Комиссия уже включена в сумму: `amount * p / (100 + p)`
    Included,
}

impl CommissionMode {
    pub fn all() -> [CommissionMode; 2] {
        [CommissionMode::OnTop, CommissionMode::Included]
    }

    pub fn code(&self) -> &'static str {
        match self {
            CommissionMode::OnTop => "on_top",
            CommissionMode::Included => "included",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "on_top" => Some(CommissionMode::OnTop),
            "included" => Some(CommissionMode::Included),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CommissionMode::OnTop => "Сверху суммы",
            CommissionMode::Included => "Включена в сумму",
        }
    }
}

/// Округление до копеек, половина округляется от нуля
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Перевести процент в сумму комиссии по выбранной формуле
pub fn percent_to_amount(amount: f64, percent: f64, mode: CommissionMode) -> f64 {
    if !amount.is_finite() || !percent.is_finite() || amount <= 0.0 || percent <= 0.0 {
        return 0.0;
    }
    match mode {
        CommissionMode::OnTop => amount * percent / 100.0,
        CommissionMode::Included => amount * percent / (100.0 + percent),
    }
}

/// Процент комиссии с учётом ручной корректировки оператора
pub fn effective_commission_percent(base_percent: f64, override_percent: Option<f64>) -> f64 {
    match override_percent {
        Some(p) if p.is_finite() => p,
        _ if base_percent.is_finite() => base_percent,
        _ => 0.0,
    }
}

/// Количество дней от даты операции до даты выплаты (или до сегодня)
pub fn elapsed_days(
    operation_date: NaiveDate,
    payment_date: Option<NaiveDate>,
    today: NaiveDate,
) -> i64 {
    let end = payment_date.unwrap_or(today);
    (end - operation_date).num_days().max(0)
}

/// Входные данные расчёта
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommissionInput {
    pub amount: f64,
    /// Базовая комиссия услуги, %
    pub base_percent: f64,
    /// Корректировка оператора, % (заменяет базовую)
    pub override_percent: Option<f64>,
    /// Дополнительная комиссия за срок, % (с бэкенда)
    pub additional_percent: f64,
    /// Ручная сумма дополнительной комиссии (заменяет расчётную)
    pub additional_override_amount: Option<f64>,
    pub mode: CommissionMode,
}

/// Результат расчёта для отображения в форме
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionBreakdown {
    pub effective_percent: f64,
    pub additional_percent: f64,
    pub total_percent: f64,
    pub commission_amount: f64,
    pub additional_amount: f64,
    pub total_commission: f64,
    pub net_amount: f64,
}

impl CommissionInput {
    pub fn calculate(&self) -> CommissionBreakdown {
        let amount = if self.amount.is_finite() && self.amount > 0.0 {
            self.amount
        } else {
            0.0
        };
        let additional_percent = if self.additional_percent.is_finite() {
            self.additional_percent.max(0.0)
        } else {
            0.0
        };

        let effective_percent = effective_commission_percent(self.base_percent, self.override_percent);
        let commission_amount = round2(percent_to_amount(amount, effective_percent, self.mode));
        let additional_amount = match self.additional_override_amount {
            Some(v) if v.is_finite() && v >= 0.0 => round2(v),
            _ => round2(percent_to_amount(amount, additional_percent, self.mode)),
        };
        let total_commission = round2(commission_amount + additional_amount);

        CommissionBreakdown {
            effective_percent,
            additional_percent,
            total_percent: effective_percent + additional_percent,
            commission_amount,
            additional_amount,
            total_commission,
            net_amount: round2(amount - total_commission),
        }
    }
}
