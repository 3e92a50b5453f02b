use rating_sync::config::SyncConfig;
use rating_sync::query::Selector;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A live `input` (or `change`) listener copying a slider's value into its
/// label. Dropping it without [`WebSubscription::keep_alive`] or
/// [`WebSubscription::detach`] invalidates the JS callback.
pub struct WebSubscription {
    slider: web_sys::HtmlInputElement,
    event: &'static str,
    handler: Closure<dyn FnMut(web_sys::Event)>,
}

impl WebSubscription {
    pub fn slider(&self) -> &web_sys::HtmlInputElement {
        &self.slider
    }

    pub fn detach(self) -> Result<(), String> {
        self.slider
            .remove_event_listener_with_callback(self.event, self.handler.as_ref().unchecked_ref())
            .map_err(|_| "slider: remove_event_listener failed".to_string())
    }

    /// Leak the callback so it stays bound for the lifetime of the page.
    pub fn keep_alive(self) {
        self.handler.forget();
    }
}

/// Pair every `input[type="range"]` under `root` with the first element
/// carrying the label class inside its parent, and subscribe.
pub fn bind_document(
    root: &web_sys::Element,
    config: &SyncConfig,
) -> Result<Vec<WebSubscription>, String> {
    let sliders = root
        .query_selector_all(&Selector::Slider.css())
        .map_err(|_| "document: query_selector_all failed".to_string())?;
    let label_selector = Selector::class(&config.label_class).css();
    let event = config.trigger().as_str();

    let mut subs = Vec::new();
    for i in 0..sliders.length() {
        let Some(slider) = sliders
            .item(i)
            .and_then(|n| n.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            continue;
        };
        let Some(parent) = slider.parent_element() else {
            continue;
        };
        let Ok(Some(label)) = parent.query_selector(&label_selector) else {
            continue;
        };

        let source = slider.clone();
        let handler = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
            label.set_text_content(Some(&source.value()));
        }) as Box<dyn FnMut(_)>);
        if slider
            .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
            .is_err()
        {
            // Listeners already attached must not outlive their callbacks.
            subs.into_iter().for_each(WebSubscription::keep_alive);
            return Err("slider: add_event_listener failed".to_string());
        }

        subs.push(WebSubscription {
            slider,
            event,
            handler,
        });
    }
    Ok(subs)
}

fn bind_page(document: &web_sys::Document) {
    let Some(root) = document.document_element() else {
        return;
    };
    match bind_document(&root, &SyncConfig::default()) {
        Ok(subs) => subs.into_iter().for_each(WebSubscription::keep_alive),
        Err(e) => web_sys::console::warn_1(&JsValue::from_str(&format!("rating_sync: {e}"))),
    }
}

/// Bind once the DOM is parsed; immediately if it already is.
pub fn start() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if document.ready_state() != "loading" {
        bind_page(&document);
        return;
    }

    let doc = document.clone();
    let on_ready = Closure::once(move |_ev: web_sys::Event| bind_page(&doc));
    if document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
        .is_err()
    {
        web_sys::console::warn_1(&JsValue::from_str(
            "rating_sync: failed to wait for DOMContentLoaded",
        ));
        return;
    }
    on_ready.forget();
}
