use gloo_timers::future::TimeoutFuture;
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Overlay + positioned surface for one modal.
///
/// Renders no header or buttons: dialogs draw their own.
#[component]
pub fn ModalFrame(
    on_close: Callback<()>,
    #[prop(optional)] z_index: Option<i32>,
    /// Extra style for the surface (`div.modal`), e.g. width limits
    #[prop(optional)]
    modal_style: Option<String>,
    #[prop(optional)] modal_class: Option<String>,
    children: Children,
) -> impl IntoView {
    let z_index = z_index.unwrap_or(1000);
    // mousedown must start on the overlay too, otherwise a text selection
    // dragged out of the dialog would close it
    let pressed_on_overlay = RwSignal::new(false);

    let on_overlay = |ev: &ev::MouseEvent| match (ev.target(), ev.current_target()) {
        (Some(target), Some(current)) => target == current,
        _ => false,
    };

    let handle_mouse_down = move |ev: ev::MouseEvent| {
        pressed_on_overlay.set(on_overlay(&ev));
    };

    let handle_click = move |ev: ev::MouseEvent| {
        let close = pressed_on_overlay.get_untracked() && on_overlay(&ev);
        pressed_on_overlay.set(false);
        if close {
            // next tick: the overlay must not be removed while its own click is dispatched
            spawn_local(async move {
                TimeoutFuture::new(0).await;
                on_close.run(());
            });
        }
    };

    let surface_class = match modal_class {
        Some(cls) if !cls.is_empty() => format!("modal {cls}"),
        _ => "modal".to_string(),
    };
    let surface_style = match modal_style {
        Some(style) if !style.is_empty() => format!("position: relative; {style}"),
        _ => "position: relative;".to_string(),
    };

    view! {
        <div
            class="modal-overlay"
            style=format!("z-index: {z_index};")
            on:mousedown=handle_mouse_down
            on:click=handle_click
        >
            <div
                class=surface_class
                style=surface_style
                on:click=|ev: ev::MouseEvent| ev.stop_propagation()
            >
                {children()}
            </div>
        </div>
    }
}
