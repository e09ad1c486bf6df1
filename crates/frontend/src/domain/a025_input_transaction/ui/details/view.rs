use super::model::InputTransactionFormDto;
use super::view_model::InputTransactionDetailsVm;
use crate::shared::components::date_input::DateInput;
use crate::shared::date_utils::days_label;
use crate::shared::icons::icon;
use crate::shared::number_format::{format_money, format_percent};
use contracts::domain::a025_input_transaction::{CommissionMode, InputTransaction};
use contracts::domain::common::AggregateRoot;
use leptos::prelude::*;
use std::rc::Rc;
use thaw::*;

#[component]
pub fn InputTransactionDetails(
    id: Option<String>,
    #[prop(into)] on_saved: Callback<()>,
    #[prop(into)] on_close: Callback<()>,
    /// Mirrors "save or upload in flight" so the host can refuse to close
    #[prop(optional)]
    busy: Option<RwSignal<bool>>,
) -> impl IntoView {
    let vm = InputTransactionDetailsVm::new(id);

    if let Some(busy) = busy {
        Effect::new(move |_| busy.set(vm.is_busy()));
    }

    view! {
        <div class="page page--detail input-transaction-details">
            <Header vm=vm on_saved=on_saved on_close=on_close />

            <div class="page__content">
                {move || vm.error.get().map(|err| view! {
                    <div class="warning-box" style="background: var(--color-error-50); border-color: var(--color-error-100); margin: var(--spacing-md);">
                        <span class="warning-box__icon" style="color: var(--color-error);">"⚠"</span>
                        <span class="warning-box__text" style="color: var(--color-error);">{err}</span>
                    </div>
                })}

                {move || {
                    if vm.is_loading.get() {
                        view! {
                            <Flex gap=FlexGap::Small style="align-items:center;padding:var(--spacing-4xl);justify-content:center;">
                                <Spinner />
                                <span>"Загрузка..."</span>
                            </Flex>
                        }
                        .into_any()
                    } else {
                        view! {
                            <div class="details-container" style="padding: var(--spacing-md);">
                                <MainSection vm=vm />
                                <CommissionSection vm=vm />
                                <PayoutSection vm=vm />
                                <EvidenceSection vm=vm />
                                <SummarySection vm=vm />
                            </div>
                        }
                        .into_any()
                    }
                }}
            </div>
        </div>
    }
}

#[component]
fn Header(
    vm: InputTransactionDetailsVm,
    on_saved: Callback<()>,
    on_close: Callback<()>,
) -> impl IntoView {
    let handle_save = move |_| {
        let on_saved: Rc<dyn Fn(())> = Rc::new(move |_: ()| on_saved.run(()));
        vm.save_command(on_saved);
    };

    view! {
        <div class="page__header">
            <div class="page__header-left">
                <h2>
                    {move || if vm.is_edit_mode() {
                        InputTransaction::element_name().to_string()
                    } else {
                        format!("{} (новая)", InputTransaction::element_name())
                    }}
                </h2>
                {move || vm.form.with(|f| f.code.clone()).filter(|c| !c.is_empty()).map(|code| view! {
                    <span class="badge badge--secondary">{code}</span>
                })}
            </div>
            <div class="page__header-right">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=handle_save
                    disabled=Signal::derive(move || vm.is_busy() || vm.is_loading.get())
                >
                    {icon("save")}
                    {move || if vm.is_saving.get() { " Сохранение..." } else { " Сохранить" }}
                </Button>
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| on_close.run(())
                    disabled=Signal::derive(move || vm.is_busy())
                >
                    {icon("x")}
                    " Закрыть"
                </Button>
            </div>
        </div>
    }
}

/// Текстовое поле, привязанное к одному полю формы
fn form_text_input(
    vm: InputTransactionDetailsVm,
    id: &'static str,
    placeholder: impl Fn() -> String + Send + Sync + 'static,
    read: fn(&InputTransactionFormDto) -> String,
    write: fn(&mut InputTransactionFormDto, String),
) -> impl IntoView {
    view! {
        <input
            class="form__input"
            type="text"
            id=id
            prop:value=move || vm.form.with(read)
            on:input=move |ev| {
                let value = event_target_value(&ev);
                vm.form.update(|f| write(f, value));
            }
            placeholder=placeholder
            disabled=move || vm.is_saving.get()
        />
    }
}

#[component]
fn MainSection(vm: InputTransactionDetailsVm) -> impl IntoView {
    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Основное"</h4>
            <div class="details-grid--3col">
                <div class="form__group">
                    <label class="form__label" for="service">"Услуга"</label>
                    <select
                        class="form__select"
                        id="service"
                        on:change=move |ev| vm.select_service(event_target_value(&ev))
                        disabled=move || vm.is_saving.get()
                    >
                        <option value="">"-- Выберите услугу --"</option>
                        {move || {
                            let selected = vm.form.with(|f| f.service_id.clone());
                            vm.services
                                .get()
                                .into_iter()
                                .filter(|s| s.is_active || s.id == selected)
                                .map(|s| {
                                    let is_selected = s.id == selected;
                                    view! {
                                        <option value=s.id.clone() selected=is_selected>
                                            {s.display_name()}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                    <span class="form__hint">
                        {move || match vm.selected_service() {
                            Some(s) => format!("Базовая комиссия: {}", format_percent(s.base_commission_percent)),
                            None if vm.services.with(|s| s.is_empty()) => "Список услуг недоступен".to_string(),
                            None => String::new(),
                        }}
                    </span>
                </div>

                <div class="form__group">
                    <label class="form__label" for="amount">"Сумма"</label>
                    {form_text_input(
                        vm,
                        "amount",
                        || "0.00".to_string(),
                        |f| f.amount.clone(),
                        |f, v| f.amount = v,
                    )}
                </div>

                <div class="form__group">
                    <label class="form__label" for="description">"Назначение платежа"</label>
                    {form_text_input(
                        vm,
                        "description",
                        || "Например: оплата по счёту 125".to_string(),
                        |f| f.description.clone(),
                        |f, v| f.description = v,
                    )}
                </div>
            </div>

            <div class="form__group">
                <label class="form__label" for="comment">"Комментарий"</label>
                <textarea
                    class="form__textarea"
                    id="comment"
                    rows="2"
                    prop:value=move || vm.form.with(|f| f.comment.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        vm.form.update(|f| f.comment = value);
                    }
                    placeholder="Дополнительная информация (необязательно)"
                />
            </div>
        </div>
    }
}

#[component]
fn CommissionSection(vm: InputTransactionDetailsVm) -> impl IntoView {
    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Комиссия"</h4>
            <div class="details-grid--3col">
                <div class="form__group">
                    <span class="form__label">"Способ расчёта"</span>
                    {CommissionMode::all()
                        .into_iter()
                        .map(|mode| view! {
                            <label class="form__radio">
                                <input
                                    type="radio"
                                    name="commission_mode"
                                    value=mode.code()
                                    prop:checked=move || vm.form.with(|f| f.commission_mode == mode)
                                    on:change=move |_| vm.form.update(|f| f.commission_mode = mode)
                                />
                                " "{mode.display_name()}
                            </label>
                        })
                        .collect_view()}
                </div>

                <div class="form__group">
                    <label class="form__label" for="commission_override">"Комиссия оператора, %"</label>
                    {form_text_input(
                        vm,
                        "commission_override",
                        move || format!("по услуге: {}", format_percent(vm.base_percent())),
                        |f| f.commission_percent_override.clone(),
                        |f, v| f.commission_percent_override = v,
                    )}
                </div>

                <div class="form__group">
                    <label class="form__label" for="additional_override">"Доп. комиссия, сумма"</label>
                    {form_text_input(
                        vm,
                        "additional_override",
                        move || {
                            format!("расчёт: {}", format_percent(vm.additional_percent()))
                        },
                        |f| f.additional_commission_override.clone(),
                        |f, v| f.additional_commission_override = v,
                    )}
                </div>
            </div>
        </div>
    }
}

#[component]
fn PayoutSection(vm: InputTransactionDetailsVm) -> impl IntoView {
    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Даты и выплата"</h4>
            <div class="details-grid--3col">
                <div class="form__group">
                    <label class="form__label" for="operation_date">"Дата операции"</label>
                    <DateInput
                        id="operation_date"
                        value=Signal::derive(move || vm.form.with(|f| f.operation_date.clone()))
                        on_change=move |v| vm.form.update(|f| f.operation_date = v)
                    />
                </div>

                <div class="form__group">
                    <label class="form__label" for="payment_date">"Дата выплаты"</label>
                    <DateInput
                        id="payment_date"
                        value=Signal::derive(move || vm.form.with(|f| f.payment_date.clone()))
                        min=Signal::derive(move || vm.form.with(|f| f.operation_date.clone()))
                        on_change=move |v| vm.form.update(|f| f.payment_date = v)
                    />
                    <span class="form__hint">
                        {move || format!("Прошло: {}", days_label(vm.elapsed_days()))}
                    </span>
                </div>

                <div class="form__group">
                    <label class="form__label" for="destination">"Назначение выплаты"</label>
                    <select
                        class="form__select"
                        id="destination"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            vm.form.update(|f| f.payment_destination_id = value);
                        }
                        disabled=move || vm.is_saving.get()
                    >
                        <option value="">"-- Выберите реквизиты --"</option>
                        {move || {
                            let selected = vm.form.with(|f| f.payment_destination_id.clone());
                            vm.destinations
                                .get()
                                .into_iter()
                                .map(|d| {
                                    let is_selected = d.id == selected;
                                    view! {
                                        <option value=d.id.clone() selected=is_selected>
                                            {d.display_name()}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                </div>
            </div>
        </div>
    }
}

#[component]
fn EvidenceSection(vm: InputTransactionDetailsVm) -> impl IntoView {
    let on_file_selected = move |ev: leptos::ev::Event| {
        use wasm_bindgen::JsCast;
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            vm.upload_evidence_command(file);
        }
        input.set_value("");
    };

    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Подтверждение"</h4>
            <input
                type="file"
                id="evidence-file"
                accept=".pdf,.png,.jpg,.jpeg"
                style="display: none;"
                on:change=on_file_selected
            />
            <Flex gap=FlexGap::Small style="align-items: center;">
                <label
                    for="evidence-file"
                    class="button button--secondary"
                    class:button--disabled=move || vm.is_busy()
                >
                    {icon("upload")}
                    {move || if vm.is_uploading.get() { " Загрузка..." } else { " Прикрепить файл" }}
                </label>
                {move || {
                    let (href, file_name) =
                        vm.form.with(|f| (f.evidence_href(), f.evidence_file_name.clone()));
                    match href {
                        Some(href) => {
                            let name = file_name.unwrap_or_else(|| "Файл".to_string());
                            view! {
                                <a href=href target="_blank" rel="noopener">
                                    {icon("file")}
                                    " "{name}
                                </a>
                                <Button
                                    appearance=ButtonAppearance::Subtle
                                    size=ButtonSize::Small
                                    on_click=move |_| vm.clear_evidence()
                                    attr:title="Открепить файл"
                                >
                                    {icon("x")}
                                </Button>
                            }
                            .into_any()
                        }
                        None => view! {
                            <span class="form__hint">"Файл не прикреплён"</span>
                        }
                        .into_any(),
                    }
                }}
            </Flex>
        </div>
    }
}

#[component]
fn SummarySection(vm: InputTransactionDetailsVm) -> impl IntoView {
    let breakdown = Memo::new(move |_| vm.breakdown());
    let row = |label: &'static str, value: Signal<String>| {
        view! {
            <span class="form__label">{label}</span>
            <span style="font-variant-numeric: tabular-nums;">{move || value.get()}</span>
        }
    };

    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Итоги"</h4>
            <div style="display:grid;grid-template-columns:max-content 1fr;gap:var(--spacing-sm) var(--spacing-xl);align-items:baseline;">
                {row("Комиссия, %:", Signal::derive(move || format_percent(breakdown.get().effective_percent)))}
                {row("Комиссия:", Signal::derive(move || format_money(breakdown.get().commission_amount)))}
                {row(
                    "Доп. комиссия, %:",
                    Signal::derive(move || {
                        match vm.additional_fee.get() {
                            Some(fee) if vm.additional_fee_is_current() => {
                                format!("{} за {}", format_percent(fee.percent), days_label(fee.days))
                            }
                            _ => "расчёт...".to_string(),
                        }
                    }),
                )}
                {row("Доп. комиссия:", Signal::derive(move || format_money(breakdown.get().additional_amount)))}
                {row("Итого комиссия, %:", Signal::derive(move || format_percent(breakdown.get().total_percent)))}
                {row("Итого комиссия:", Signal::derive(move || format_money(breakdown.get().total_commission)))}

                <span class="form__label">"К выплате:"</span>
                <strong style="font-size:var(--font-size-lg);font-variant-numeric:tabular-nums;">
                    {move || format_money(breakdown.get().net_amount)}
                </strong>
            </div>
        </div>
    }
}
