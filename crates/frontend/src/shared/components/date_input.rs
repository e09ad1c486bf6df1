use leptos::prelude::*;

/// Native date picker bound to an ISO (`yyyy-mm-dd`) string
///
/// The browser shows the date in the user's locale (dd.mm.yyyy for RU).
#[component]
pub fn DateInput(
    #[prop(into)] value: Signal<String>,
    /// Receives the new value in yyyy-mm-dd format ("" when cleared)
    on_change: impl Fn(String) + 'static,
    /// Earliest selectable date (yyyy-mm-dd)
    #[prop(optional, into)]
    min: Option<Signal<String>>,
    #[prop(optional)] id: Option<&'static str>,
) -> impl IntoView {
    view! {
        <input
            type="date"
            class="form__input form__input--date"
            id=id
            prop:value=value
            min=move || min.map(|m| m.get()).filter(|m| !m.is_empty())
            on:input=move |ev| {
                on_change(event_target_value(&ev));
            }
        />
    }
}
