use super::frame::ModalFrame;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use std::sync::Arc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::KeyboardEvent;

/// Returns false while the modal must stay open (e.g. a save is in flight)
pub type CloseGuard = Arc<dyn Fn() -> bool + Send + Sync>;

type ModalBuilder = Arc<dyn Fn(ModalHandle) -> AnyView + Send + Sync>;

#[derive(Clone)]
struct ModalEntry {
    id: u64,
    builder: ModalBuilder,
    modal_style: Option<String>,
    modal_class: Option<String>,
    can_close: Option<CloseGuard>,
}

impl ModalEntry {
    fn may_close(&self) -> bool {
        self.can_close.as_ref().map(|f| f()).unwrap_or(true)
    }
}

/// Lets a modal close itself from its own event handlers
#[derive(Clone)]
pub struct ModalHandle {
    id: u64,
    svc: ModalStackService,
}

impl ModalHandle {
    pub fn close(&self) {
        self.svc.close_deferred(self.id);
    }
}

/// Stack of open modals, provided in context at the app root.
///
/// Escape and overlay clicks close only the topmost modal (see `ModalHost`).
#[derive(Clone, Copy)]
pub struct ModalStackService {
    stack: RwSignal<Vec<ModalEntry>>,
    next_id: RwSignal<u64>,
}

impl ModalStackService {
    pub fn new() -> Self {
        Self {
            stack: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(1),
        }
    }

    pub fn is_open(&self) -> bool {
        self.stack.with(|s| !s.is_empty())
    }

    /// Push a modal with optional surface style/class and close guard.
    ///
    /// `builder` receives a `ModalHandle` so the modal can close itself.
    pub fn push<F>(
        &self,
        modal_style: Option<String>,
        modal_class: Option<String>,
        can_close: Option<CloseGuard>,
        builder: F,
    ) -> ModalHandle
    where
        F: Fn(ModalHandle) -> AnyView + Send + Sync + 'static,
    {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);

        self.stack.update(|s| {
            s.push(ModalEntry {
                id,
                builder: Arc::new(builder),
                modal_style,
                modal_class,
                can_close,
            });
        });

        ModalHandle { id, svc: *self }
    }

    pub fn close(&self, id: u64) {
        self.stack.update(|s| s.retain(|e| e.id != id));
    }

    pub fn clear(&self) {
        self.stack.set(Vec::new());
    }

    // Removal is deferred to the next tick so a modal is never dropped while
    // the DOM event that closes it is still being dispatched.
    fn defer(&self, f: impl FnOnce(ModalStackService) + 'static) {
        let svc = *self;
        spawn_local(async move {
            TimeoutFuture::new(0).await;
            f(svc);
        });
    }

    pub fn close_deferred(&self, id: u64) {
        self.defer(move |svc| svc.close(id));
    }

    /// Whether the topmost modal may be closed now (false when nothing is open)
    pub fn top_may_close(&self) -> bool {
        self.stack
            .with_untracked(|s| s.last().map(ModalEntry::may_close).unwrap_or(false))
    }

    /// Close the topmost modal unless its guard refuses
    pub fn pop_guarded_deferred(&self) {
        if self.top_may_close() {
            self.defer(|svc| svc.stack.update(|s| {
                s.pop();
            }));
        }
    }
}

impl Default for ModalStackService {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the modal stack. Mount exactly once at the app root.
#[component]
pub fn ModalHost() -> impl IntoView {
    let svc = use_context::<ModalStackService>()
        .expect("ModalStackService not provided in context (provide it in app root)");

    Effect::new(move |_| {
        let on_keydown = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() {
                if keyboard_event.key() == "Escape" {
                    svc.pop_guarded_deferred();
                }
            }
        }) as Box<dyn FnMut(_)>);

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
            // host lives as long as the app
            on_keydown.forget();
        }
    });

    view! {
        <Show when=move || svc.is_open()>
            <For
                each=move || {
                    svc.stack
                        .get()
                        .into_iter()
                        .enumerate()
                        .collect::<Vec<(usize, ModalEntry)>>()
                }
                key=|(_, entry)| entry.id
                children=move |(idx, entry): (usize, ModalEntry)| {
                    let on_close = {
                        let entry = entry.clone();
                        Callback::new(move |_| {
                            if entry.may_close() {
                                svc.close_deferred(entry.id);
                            }
                        })
                    };
                    let z_index = 1000 + idx as i32;
                    let content = (entry.builder)(ModalHandle { id: entry.id, svc });

                    view! {
                        <ModalFrame
                            z_index=z_index
                            on_close=on_close
                            modal_style=entry.modal_style.clone().unwrap_or_default()
                            modal_class=entry.modal_class.clone().unwrap_or_default()
                        >
                            {content}
                        </ModalFrame>
                    }
                }
            />
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_modal(_: ModalHandle) -> AnyView {
        ().into_any()
    }

    #[test]
    fn test_close_guard_refuses_while_busy() {
        let svc = ModalStackService::new();
        let busy = RwSignal::new(true);
        svc.push(
            None,
            None,
            Some(Arc::new(move || !busy.get_untracked())),
            empty_modal,
        );

        assert!(svc.is_open());
        assert!(!svc.top_may_close());

        busy.set(false);
        assert!(svc.top_may_close());
    }

    #[test]
    fn test_only_topmost_guard_applies() {
        let svc = ModalStackService::new();
        svc.push(None, None, Some(Arc::new(|| false)), empty_modal);
        let top = svc.push(None, None, None, empty_modal);
        assert!(svc.top_may_close());

        svc.close(top.id);
        assert!(!svc.top_may_close());

        svc.clear();
        assert!(!svc.is_open());
        assert!(!svc.top_may_close());
    }
}
