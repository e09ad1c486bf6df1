use crate::domain::a025_input_transaction::ui::details::model::{fetch_services, get_json};
use crate::domain::a025_input_transaction::ui::details::InputTransactionDetails;
use crate::shared::api_utils::api_url;
use crate::shared::date_utils::format_naive_date;
use crate::shared::icons::icon;
use crate::shared::modal::ModalStackService;
use crate::shared::number_format::format_money;
use contracts::domain::a025_input_transaction::{InputTransaction, ServiceRef};
use contracts::domain::common::AggregateRoot;
use gloo_net::http::Request;
use leptos::prelude::*;
use std::sync::Arc;
use thaw::*;

#[derive(Clone, Debug, PartialEq)]
pub struct InputTransactionRow {
    pub id: String,
    pub code: String,
    pub operation_date: String,
    pub service: String,
    pub description: String,
    pub amount: f64,
    pub commission_total: f64,
    pub net_amount: f64,
    pub elapsed_days: i64,
    pub has_evidence: bool,
}

impl InputTransactionRow {
    pub fn from_aggregate(t: InputTransaction, services: &[ServiceRef]) -> Self {
        let service = ServiceRef::find(services, &t.service_id)
            .map(|s| s.description.clone())
            .unwrap_or_else(|| t.service_id.clone());
        Self {
            id: t.to_string_id(),
            has_evidence: t.has_evidence(),
            code: t.base.code,
            operation_date: format_naive_date(t.operation_date),
            service,
            description: t.base.description,
            amount: t.amount,
            commission_total: t.commission_total,
            net_amount: t.net_amount,
            elapsed_days: t.elapsed_days,
        }
    }
}

#[component]
pub fn InputTransactionList() -> impl IntoView {
    let items = RwSignal::new(Vec::<InputTransactionRow>::new());
    let error = RwSignal::new(None::<String>);
    let is_loading = RwSignal::new(false);
    let dialog_busy = RwSignal::new(false);
    let modal_stack =
        use_context::<ModalStackService>().expect("ModalStackService not found in context");

    let fetch = move || {
        is_loading.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            let services = fetch_services().await.unwrap_or_else(|e| {
                log::warn!("Не удалось загрузить услуги: {}", e);
                Vec::new()
            });
            match fetch_input_transactions().await {
                Ok(list) => {
                    let rows = list
                        .into_iter()
                        .map(|t| InputTransactionRow::from_aggregate(t, &services))
                        .collect();
                    items.set(rows);
                    error.set(None);
                }
                Err(e) => error.set(Some(e)),
            }
            is_loading.set(false);
        });
    };

    let open_details_modal = move |id: Option<String>| {
        modal_stack.clear();
        dialog_busy.set(false);
        modal_stack.push(
            Some("max-width: min(1100px, 95vw); width: min(1100px, 95vw);".to_string()),
            Some("input-transaction-details-modal".to_string()),
            Some(Arc::new(move || !dialog_busy.get_untracked())),
            move |handle| {
                let on_saved = Callback::new({
                    let handle = handle.clone();
                    move |_| {
                        handle.close();
                        fetch();
                    }
                });
                let on_close = Callback::new(move |_| handle.close());

                view! {
                    <InputTransactionDetails
                        id=id.clone()
                        on_saved=on_saved
                        on_close=on_close
                        busy=dialog_busy
                    />
                }
                .into_any()
            },
        );
    };

    let delete_row = move |id: String, title: String| {
        let confirmed = web_sys::window()
            .and_then(|win| {
                win.confirm_with_message(&format!("Удалить транзакцию «{}»?", title))
                    .ok()
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        wasm_bindgen_futures::spawn_local(async move {
            match delete_input_transaction(&id).await {
                Ok(()) => {
                    log::info!("Input transaction deleted: {}", id);
                    fetch();
                }
                Err(e) => error.set(Some(format!("Ошибка удаления: {}", e))),
            }
        });
    };

    fetch();

    view! {
        <div class="page">
            <div class="page__header">
                <div class="page__header-left">
                    {icon("payments")}
                    <h1 class="page__title">{InputTransaction::list_name()}</h1>
                </div>
                <div class="page__header-right">
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| open_details_modal(None)>
                        {icon("plus")}
                        " Новая транзакция"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| fetch()
                        disabled=Signal::derive(move || is_loading.get())
                    >
                        {icon("refresh")}
                        " Обновить"
                    </Button>
                </div>
            </div>

            {move || error.get().map(|e| view! {
                <div class="warning-box" style="background: var(--color-error-50); border-color: var(--color-error-100);">
                    <span class="warning-box__icon" style="color: var(--color-error);">"⚠"</span>
                    <span class="warning-box__text" style="color: var(--color-error);">{e}</span>
                </div>
            })}

            <div class="table">
                <table class="table__data table--striped">
                    <thead class="table__head">
                        <tr>
                            <th class="table__header-cell">"Код"</th>
                            <th class="table__header-cell">"Дата"</th>
                            <th class="table__header-cell">"Услуга"</th>
                            <th class="table__header-cell">"Назначение"</th>
                            <th class="table__header-cell table__header-cell--right">"Сумма"</th>
                            <th class="table__header-cell table__header-cell--right">"Комиссия"</th>
                            <th class="table__header-cell table__header-cell--right">"К выплате"</th>
                            <th class="table__header-cell table__header-cell--right">"Дней"</th>
                            <th class="table__header-cell"></th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || items.get().into_iter().map(|row| {
                            let id_for_click = row.id.clone();
                            let id_for_delete = row.id.clone();
                            let title = if row.code.is_empty() { row.description.clone() } else { row.code.clone() };
                            view! {
                                <tr class="table__row" on:click=move |_| open_details_modal(Some(id_for_click.clone()))>
                                    <td class="table__cell">{row.code}</td>
                                    <td class="table__cell">{row.operation_date}</td>
                                    <td class="table__cell">{row.service}</td>
                                    <td class="table__cell">
                                        {row.description}
                                        {row.has_evidence.then(|| view! { " " {icon("file")} })}
                                    </td>
                                    <td class="table__cell table__cell--right">{format_money(row.amount)}</td>
                                    <td class="table__cell table__cell--right">{format_money(row.commission_total)}</td>
                                    <td class="table__cell table__cell--right">{format_money(row.net_amount)}</td>
                                    <td class="table__cell table__cell--right">{row.elapsed_days}</td>
                                    <td class="table__cell">
                                        <button
                                            class="button button--ghost button--small"
                                            title="Удалить"
                                            on:click=move |ev| {
                                                ev.stop_propagation();
                                                delete_row(id_for_delete.clone(), title.clone());
                                            }
                                        >
                                            {icon("delete")}
                                        </button>
                                    </td>
                                </tr>
                            }
                        }).collect_view()}
                    </tbody>
                </table>
                {move || (!is_loading.get() && items.with(|i| i.is_empty())).then(|| view! {
                    <div class="table__empty">"Нет транзакций"</div>
                })}
            </div>
        </div>
    }
}

async fn fetch_input_transactions() -> Result<Vec<InputTransaction>, String> {
    get_json(&api_url(&InputTransaction::api_path())).await
}

async fn delete_input_transaction(id: &str) -> Result<(), String> {
    let url = api_url(&format!(
        "{}/{}",
        InputTransaction::api_path(),
        urlencoding::encode(id)
    ));
    let response = Request::delete(&url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| format!("Ошибка сети: {}", e))?;
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction() -> InputTransaction {
        serde_json::from_value(serde_json::json!({
            "id": "5f0c2f9e-7a1b-4c1e-9a55-0d2b6f3c8e11",
            "code": "IT-00042",
            "description": "Поступление по договору 17",
            "serviceId": "svc-1",
            "amount": 1000.0,
            "commissionMode": "on_top",
            "operationDate": "2025-03-01",
            "paymentDestinationId": "dst-1",
            "commissionTotal": 20.0,
            "netAmount": 980.0,
            "elapsedDays": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_row_resolves_service_name() {
        let services = vec![ServiceRef {
            id: "svc-1".to_string(),
            code: "S1".to_string(),
            description: "Эквайринг".to_string(),
            base_commission_percent: 2.0,
            is_active: true,
        }];

        let row = InputTransactionRow::from_aggregate(transaction(), &services);
        assert_eq!(row.service, "Эквайринг");
        assert_eq!(row.operation_date, "01.03.2025");
        assert_eq!(row.net_amount, 980.0);
        assert_eq!(row.elapsed_days, 3);
        assert!(!row.has_evidence);
    }

    #[test]
    fn test_row_falls_back_to_service_id() {
        let row = InputTransactionRow::from_aggregate(transaction(), &[]);
        assert_eq!(row.service, "svc-1");
        assert_eq!(row.code, "IT-00042");
    }
}
