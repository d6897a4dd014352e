//! Glass DOM: a fixed container holding the WebGL canvas, the clone layer
//! and the debug readout.
//!
//! ```text
//! <div>              fixed, clipped to the glass shape
//!   <canvas>         magnified pixels
//!   <div>            widget clones, rebuilt every frame
//!   <pre>            debug lines
//! ```

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, HtmlCanvasElement, HtmlElement, HtmlImageElement, HtmlInputElement, HtmlTextAreaElement,
    HtmlVideoElement, Window,
};

use crate::compositor::{CloneSpec, Placed, Playback, Snapshot, WidgetKind, clone_spec};
use crate::config::Config;
use crate::geometry::Point;
use crate::host::HostError;

const GLASS_Z_INDEX: &str = "10000";

fn px(v: f64) -> String {
    format!("{v}px")
}

fn style(element: &HtmlElement, props: &[(&str, &str)]) {
    let decl = element.style();
    for (name, value) in props {
        if let Err(e) = decl.set_property(name, value) {
            log::debug!("style {name}: {value} rejected: {e:?}");
        }
    }
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, HostError> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| HostError::Js(format!("<{tag}> has an unexpected element type")))
}

pub struct Overlay {
    window: Window,
    document: Document,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    clones: HtmlElement,
    debug: HtmlElement,
    /// Active border width; CSS `left`/`top` position the border edge.
    border_px: f64,
    /// Shared rejection handler for clone `play()` promises.
    on_play_error: Closure<dyn FnMut(JsValue)>,
}

impl Overlay {
    /// Build the glass and attach it, hidden, to `<body>`.
    pub fn create(window: &Window) -> Result<Self, HostError> {
        let document = window.document().ok_or(HostError::MissingProperty("document"))?;
        let body = document.body().ok_or(HostError::MissingProperty("document.body"))?;

        let container: HtmlElement = create(&document, "div")?;
        style(&container, &[
            ("position", "fixed"),
            ("left", "0"),
            ("top", "0"),
            ("display", "none"),
            ("overflow", "hidden"),
            ("pointer-events", "none"),
            ("box-sizing", "content-box"),
            ("z-index", GLASS_Z_INDEX),
        ]);

        let canvas: HtmlCanvasElement = create(&document, "canvas")?;
        style(&canvas, &[("display", "block"), ("width", "100%"), ("height", "100%")]);

        let clones: HtmlElement = create(&document, "div")?;
        style(&clones, &[
            ("position", "absolute"),
            ("left", "0"),
            ("top", "0"),
            ("width", "100%"),
            ("height", "100%"),
            ("overflow", "hidden"),
            ("pointer-events", "none"),
        ]);

        let debug: HtmlElement = create(&document, "pre")?;
        style(&debug, &[
            ("position", "absolute"),
            ("left", "15%"),
            ("bottom", "15%"),
            ("margin", "0"),
            ("padding", "2px 4px"),
            ("font", "11px/1.3 monospace"),
            ("color", "#0f0"),
            ("background", "rgba(0, 0, 0, 0.6)"),
            ("display", "none"),
        ]);

        container.append_child(&canvas)?;
        container.append_child(&clones)?;
        container.append_child(&debug)?;
        body.append_child(&container)?;

        let on_play_error = Closure::<dyn FnMut(JsValue)>::new(|e: JsValue| {
            log::warn!("video clone could not start playback: {e:?}");
        });

        Ok(Self { window: window.clone(), document, container, canvas, clones, debug, border_px: 0.0, on_play_error })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Size, border and shape from the configuration.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply_config(&mut self, config: &Config) {
        let d = config.glass_diameter;
        self.border_px = config.border_px();
        let border = if self.border_px > 0.0 {
            format!("{}px solid {}", self.border_px, config.border_color)
        } else {
            "none".to_owned()
        };
        let size = px(d);
        let radius = config.shape.border_radius(d);
        style(&self.container, &[
            ("width", size.as_str()),
            ("height", size.as_str()),
            ("border", border.as_str()),
            ("border-radius", radius.as_str()),
        ]);
        let side = d.round().max(1.0) as u32;
        self.canvas.set_width(side);
        self.canvas.set_height(side);
    }

    pub fn show(&self) {
        style(&self.container, &[("display", "block")]);
    }

    /// Hide the glass and drop every clone and debug line.
    pub fn hide(&self) {
        style(&self.container, &[("display", "none")]);
        self.clones.set_inner_html("");
        self.show_debug(None);
    }

    /// Move the glass so its content box starts at `origin` (client pixels).
    pub fn place(&self, origin: Point) {
        let (left, top) = (px(origin.x - self.border_px), px(origin.y - self.border_px));
        style(&self.container, &[("left", left.as_str()), ("top", top.as_str())]);
    }

    /// Replace all clones with fresh ones for this frame.
    ///
    /// `pixel_ratio` is host canvas backing pixels per CSS pixel.
    pub fn rebuild_clones(&self, placed: &[Placed<HtmlElement>], pixel_ratio: f64) {
        self.clones.set_inner_html("");
        for item in placed {
            let Some(snapshot) = self.snapshot(&item.element, item.kind) else {
                continue;
            };
            let spec = clone_spec(item, &snapshot, pixel_ratio);
            match self.build(&spec) {
                Ok(clone) => {
                    if let Err(e) = self.clones.append_child(&clone) {
                        log::debug!("could not attach {} clone: {e:?}", spec.tag);
                    }
                }
                Err(e) => log::debug!("could not build {} clone: {e}", spec.tag),
            }
        }
    }

    pub fn show_debug(&self, lines: Option<&[String]>) {
        match lines {
            Some(lines) => {
                self.debug.set_text_content(Some(lines.join("\n").as_str()));
                style(&self.debug, &[("display", "block")]);
            }
            None => style(&self.debug, &[("display", "none")]),
        }
    }

    /// Detach the glass from the page.
    pub fn remove(&self) {
        self.container.remove();
    }

    fn snapshot(&self, element: &HtmlElement, kind: WidgetKind) -> Option<Snapshot> {
        match kind {
            WidgetKind::Text => {
                let (value, multiline) = if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
                    (area.value(), true)
                } else {
                    (element.dyn_ref::<HtmlInputElement>()?.value(), false)
                };
                let css = |name: &str| match self.window.get_computed_style(element) {
                    Ok(Some(decl)) => decl.get_property_value(name).unwrap_or_default(),
                    _ => String::new(),
                };
                Some(Snapshot::Text {
                    value,
                    multiline,
                    background: css("background-color"),
                    color: css("color"),
                    border: css("border"),
                    font_family: css("font-family"),
                    font_size: css("font-size"),
                })
            }
            WidgetKind::Image => {
                let img = element.dyn_ref::<HtmlImageElement>()?;
                Some(Snapshot::Image { src: img.src(), alt: img.alt() })
            }
            WidgetKind::Video => {
                let video = element.dyn_ref::<HtmlVideoElement>()?;
                let src = if video.current_src().is_empty() { video.src() } else { video.current_src() };
                Some(Snapshot::Video {
                    src,
                    looped: video.loop_(),
                    current_time: video.current_time(),
                    paused: video.paused(),
                })
            }
        }
    }

    fn build(&self, spec: &CloneSpec) -> Result<HtmlElement, HostError> {
        let element: HtmlElement = create(&self.document, spec.tag)?;
        for (name, value) in &spec.attributes {
            element.set_attribute(name, value)?;
        }
        let styles: Vec<(&str, &str)> = spec.styles.iter().map(|(k, v)| (*k, v.as_str())).collect();
        style(&element, &styles);

        if let Some(value) = &spec.value {
            if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
                area.set_value(value);
            } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.set_value(value);
            }
        }
        if let (Some(playback), Some(video)) = (spec.playback, element.dyn_ref::<HtmlVideoElement>()) {
            self.start(video, playback);
        }
        Ok(element)
    }

    fn start(&self, video: &HtmlVideoElement, playback: Playback) {
        video.set_muted(playback.muted);
        video.set_loop(playback.looped);
        video.set_current_time(playback.current_time);
        if !playback.play {
            return;
        }
        match video.play() {
            Ok(promise) => {
                // Nothing awaits the chained promise.
                drop(promise.catch(&self.on_play_error));
            }
            Err(e) => log::warn!("video clone could not start playback: {e:?}"),
        }
    }
}
