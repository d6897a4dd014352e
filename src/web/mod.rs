//! Browser shell (feature `web`).
//!
//! [`install`] is the only export. It waits for the host canvas, builds the
//! glass, and connects window events to [`MagnifierCore`]. The core decides;
//! this module carries out its [`Action`]s against the DOM, WebGL2,
//! `localStorage` and `requestAnimationFrame`.
//!
//! All mutable state lives in one `Rc<RefCell<Shell>>`. Window listeners hold
//! it strongly for the page's lifetime. The frame callback and the settings
//! callbacks hold it weakly.

mod host;
mod overlay;
mod settings;
mod storage;
mod webgl;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, WebGl2RenderingContext, Window};

use crate::controller::{Action, MagnifierCore};
use crate::geometry::{Point, Size};
use crate::gpu::GpuError;
use crate::host::{CanvasProbe, HostCanvas, ProbeOutcome, discover_candidates};
use crate::input::{Key, Modifiers};
use crate::persistence::{load_offsets, save_offsets};
use crate::render::{RenderError, Renderer};
use crate::settings::{SettingSink, load_config, subscribe};

use self::host::JsHost;
use self::overlay::Overlay;
use self::settings::JsSettings;
use self::storage::LocalStorage;

/// Attach the magnifier to a graph editor.
///
/// `app` is the editor's application object. Its canvas may not exist yet;
/// the lookup is retried on a fixed delay until it appears or the attempt
/// budget runs out.
#[wasm_bindgen]
pub fn install(app: JsValue) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("logger already installed");
    }
    attach_when_ready(app, CanvasProbe::default());
}

fn attach_when_ready(app: JsValue, mut probe: CanvasProbe) {
    let found = host::find_canvas(&app);
    match (probe.record(found.is_ok()), found) {
        (ProbeOutcome::Found, Ok(canvas)) => {
            log::debug!("host canvas found after {} attempt(s)", probe.attempts());
            start(app, canvas);
        }
        (ProbeOutcome::RetryAfter(delay_ms), _) => {
            Timeout::new(delay_ms, move || attach_when_ready(app, probe)).forget();
        }
        _ => {}
    }
}

fn start(app: JsValue, canvas: HtmlCanvasElement) {
    let Some(window) = web_sys::window() else {
        log::error!("no window; magnifier disabled");
        return;
    };

    let mut settings = JsSettings::from_app(&app);
    let storage = LocalStorage::open();
    let mut config = load_config(&settings);
    config.manual_offset = load_offsets(&storage);
    match serde_json::to_string(&config) {
        Ok(json) => log::debug!("magnifier config: {json}"),
        Err(e) => log::debug!("magnifier config not printable: {e}"),
    }

    let mut overlay = match Overlay::create(&window) {
        Ok(overlay) => overlay,
        Err(e) => {
            log::error!("could not build the magnifier glass; magnifier disabled: {e}");
            return;
        }
    };
    overlay.apply_config(&config);

    let viewport = Size::new(config.glass_diameter, config.glass_diameter);
    let renderer = match webgl::context(overlay.canvas()).and_then(|gl| Renderer::initialize(gl, config.filter, viewport)) {
        Ok(renderer) => renderer,
        Err(e) => {
            overlay.remove();
            log::error!("magnifier renderer failed to initialize; magnifier disabled: {e}");
            return;
        }
    };

    let shell = Rc::new(RefCell::new(Shell {
        core: MagnifierCore::new(config),
        renderer,
        overlay,
        host: JsHost::new(app, canvas),
        storage,
        window: window.clone(),
        frame_callback: None,
    }));

    let weak = Rc::downgrade(&shell);
    shell.borrow_mut().frame_callback = Some(Closure::<dyn FnMut(f64)>::new(move |_ts: f64| {
        if let Some(shell) = weak.upgrade() {
            shell.borrow_mut().render_frame();
        }
    }));

    let registered = subscribe(&mut settings, &shell);
    listen(&window, &shell);
    log::info!("magnifier ready ({registered} settings registered)");
}

// =============================================================================
// EVENTS
// =============================================================================

fn listen(window: &Window, shell: &Rc<RefCell<Shell>>) {
    on(window, "keydown", shell, |s, e| {
        if let Some(e) = e.dyn_ref::<KeyboardEvent>() {
            s.key_down(e);
        }
    });
    on(window, "keyup", shell, |s, e| {
        if let Some(e) = e.dyn_ref::<KeyboardEvent>() {
            s.key_up(e);
        }
    });
    on(window, "pointermove", shell, |s, e| {
        if let Some(e) = e.dyn_ref::<MouseEvent>() {
            s.pointer_move(e);
        }
    });
    on(window, "blur", shell, |s, _| s.blur());
}

fn on(window: &Window, kind: &str, shell: &Rc<RefCell<Shell>>, handler: fn(&mut Shell, &Event)) {
    let shell = Rc::clone(shell);
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(&mut shell.borrow_mut(), &event));
    if let Err(e) = window.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref()) {
        log::warn!("could not listen for {kind}: {e:?}");
    }
    callback.forget();
}

fn modifiers(event: &KeyboardEvent) -> Modifiers {
    Modifiers { shift: event.shift_key(), ctrl: event.ctrl_key(), alt: event.alt_key(), meta: event.meta_key() }
}

// =============================================================================
// SHELL
// =============================================================================

struct Shell {
    core: MagnifierCore,
    renderer: Renderer<WebGl2RenderingContext>,
    overlay: Overlay,
    host: JsHost,
    storage: LocalStorage,
    window: Window,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
}

impl Shell {
    fn key_down(&mut self, event: &KeyboardEvent) {
        self.refresh_host();
        let key = Key::new(event.key());
        let actions = self.core.on_key_down(&key, modifiers(event));
        // Keep arrow nudges from scrolling the page.
        if key.arrow_direction().is_some() && !actions.is_empty() {
            event.prevent_default();
        }
        self.dispatch(actions);
    }

    fn key_up(&mut self, event: &KeyboardEvent) {
        let actions = self.core.on_key_up(&Key::new(event.key()));
        self.dispatch(actions);
    }

    fn pointer_move(&mut self, event: &MouseEvent) {
        let client = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
        let actions = self.core.on_pointer_move(client);
        self.dispatch(actions);
    }

    fn blur(&mut self) {
        let actions = self.core.on_blur();
        self.dispatch(actions);
    }

    fn refresh_host(&mut self) {
        match self.host.snapshot() {
            Ok(snapshot) => self.core.sync_host(snapshot),
            Err(e) => log::debug!("host canvas unreadable: {e}"),
        }
    }

    fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::ShowGlass => self.overlay.show(),
                Action::HideGlass => self.overlay.hide(),
                Action::RequestFrame => self.request_frame(),
                Action::PersistOffsets(offset) => save_offsets(&mut self.storage, offset),
                Action::Restyle => {
                    let config = self.core.config();
                    self.overlay.apply_config(config);
                    self.renderer.set_viewport(Size::new(config.glass_diameter, config.glass_diameter));
                }
                Action::SetFilter(mode) => {
                    self.renderer.update_filter_mode(mode);
                }
            }
        }
    }

    /// Ask for one animation frame. If the browser refuses, the request is
    /// dropped and the next input event asks again.
    fn request_frame(&mut self) {
        let requested = match &self.frame_callback {
            Some(callback) => self.window.request_animation_frame(callback.as_ref().unchecked_ref()),
            None => Err(JsValue::from_str("frame callback not installed")),
        };
        if let Err(e) = requested {
            log::warn!("requestAnimationFrame failed: {e:?}");
            self.core.skip_frame();
        }
    }

    fn render_frame(&mut self) {
        if !self.core.render_pending() {
            return;
        }
        if !self.renderer.is_valid() {
            self.core.skip_frame();
            return;
        }
        let snapshot = match self.host.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("host canvas unreadable; skipping frame: {e}");
                let actions = self.core.retry_frame();
                self.dispatch(actions);
                return;
            }
        };

        let host = &self.host;
        let Some(plan) = self.core.on_frame(snapshot, |canvas| discover_candidates(host, canvas)) else {
            return;
        };

        if let Err(e) = self.renderer.render(self.host.surface(), plan.canvas.backing, &plan.sample) {
            // Upload failures are already reported by the renderer.
            if !matches!(e, RenderError::Gpu(GpuError::TextureUpload(_))) {
                log::warn!("magnifier frame failed: {e}");
            }
            let actions = self.core.retry_frame();
            self.dispatch(actions);
            return;
        }
        // Move the glass only once its new image is in place.
        self.overlay.place(plan.glass_origin);
        self.overlay.rebuild_clones(&plan.clones, plan.canvas.pixel_ratio());
        self.overlay.show_debug(plan.debug.as_deref());
    }
}

impl SettingSink for Shell {
    fn setting_changed(&mut self, id: &str, value: &Value) {
        let actions = self.core.apply_setting(id, value);
        self.dispatch(actions);
    }
}
