use crate::domain::a025_input_transaction::ui::InputTransactionList;
use crate::shared::modal::{ModalHost, ModalStackService};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Single modal stack for the whole app; the host renders it above the page.
    provide_context(ModalStackService::new());

    view! {
        <main class="app">
            <InputTransactionList />
        </main>
        <ModalHost />
    }
}
