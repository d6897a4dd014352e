//! Host adapter over the graph editor's application object.
//!
//! Reads go through `js_sys::Reflect` on the object handed to
//! [`super::install`]:
//!
//! - `app.canvas.canvas`: the rendered `<canvas>` element;
//! - `app.canvas.ds.scale` / `app.canvas.ds.offset`: pan/zoom transform;
//! - `app.graph._nodes[*].widgets[*]`: DOM widgets attached to nodes.

use js_sys::{Array, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::geometry::{HostTransform, Rect, Size};
use crate::host::{CanvasSnapshot, HostCanvas, HostError, HostWidget, WidgetTree};

impl From<JsValue> for HostError {
    fn from(value: JsValue) -> Self {
        HostError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Read `target[key]`, treating `undefined` and `null` as missing.
fn prop(target: &JsValue, key: &'static str) -> Result<JsValue, HostError> {
    if target.is_undefined() || target.is_null() {
        return Err(HostError::MissingProperty(key));
    }
    let value = Reflect::get(target, &JsValue::from_str(key))?;
    if value.is_undefined() || value.is_null() {
        return Err(HostError::MissingProperty(key));
    }
    Ok(value)
}

fn number(target: &JsValue, key: &'static str) -> Result<f64, HostError> {
    prop(target, key)?.as_f64().ok_or(HostError::MissingProperty(key))
}

/// Locate the host's canvas element.
///
/// # Errors
///
/// [`HostError::CanvasNotFound`] until the editor has mounted its canvas.
pub fn find_canvas(app: &JsValue) -> Result<HtmlCanvasElement, HostError> {
    let element = prop(app, "canvas").and_then(|c| prop(&c, "canvas")).map_err(|_| HostError::CanvasNotFound)?;
    element.dyn_into::<HtmlCanvasElement>().map_err(|_| HostError::CanvasNotFound)
}

pub struct JsHost {
    app: JsValue,
    canvas: HtmlCanvasElement,
}

impl JsHost {
    pub fn new(app: JsValue, canvas: HtmlCanvasElement) -> Self {
        Self { app, canvas }
    }
}

impl HostCanvas for JsHost {
    type Surface = HtmlCanvasElement;

    fn surface(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn snapshot(&self) -> Result<CanvasSnapshot, HostError> {
        let ds = prop(&prop(&self.app, "canvas")?, "ds")?;
        let scale = number(&ds, "scale")?;
        let offset = prop(&ds, "offset")?;
        let ox = Reflect::get_u32(&offset, 0)?.as_f64().ok_or(HostError::MissingProperty("ds.offset[0]"))?;
        let oy = Reflect::get_u32(&offset, 1)?.as_f64().ok_or(HostError::MissingProperty("ds.offset[1]"))?;

        let r = self.canvas.get_bounding_client_rect();
        Ok(CanvasSnapshot {
            transform: HostTransform::new(scale, ox, oy),
            backing: Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height())),
            client_rect: Rect::new(r.left(), r.top(), r.width(), r.height()),
        })
    }
}

impl WidgetTree for JsHost {
    type Element = HtmlElement;

    fn widgets(&self) -> Vec<HostWidget<HtmlElement>> {
        let nodes = match prop(&self.app, "graph").and_then(|g| prop(&g, "_nodes")) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::debug!("no graph nodes to scan: {e}");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for node in Array::from(&nodes).iter() {
            let Ok(widgets) = prop(&node, "widgets") else {
                continue;
            };
            for widget in Array::from(&widgets).iter() {
                if let Some(element) = widget_element(&widget) {
                    found.push(describe(element));
                }
            }
        }
        found
    }
}

/// The DOM element a widget renders into, narrowed to media when wrapped.
fn widget_element(widget: &JsValue) -> Option<HtmlElement> {
    let element = ["element", "inputEl"].into_iter().find_map(|key| match prop(widget, key) {
        Ok(value) => as_html(value),
        Err(_) => None,
    })?;

    match element.tag_name().as_str() {
        "TEXTAREA" | "INPUT" | "IMG" | "VIDEO" => Some(element),
        _ => match element.query_selector("video, img") {
            Ok(Some(child)) => as_html(child.into()),
            Ok(None) => None,
            Err(e) => {
                log::debug!("widget query failed: {e:?}");
                None
            }
        },
    }
}

fn as_html(value: JsValue) -> Option<HtmlElement> {
    if let Ok(element) = value.dyn_into::<HtmlElement>() { Some(element) } else { None }
}

fn describe(element: HtmlElement) -> HostWidget<HtmlElement> {
    let r = element.get_bounding_client_rect();
    HostWidget {
        tag: element.tag_name(),
        client_rect: Rect::new(r.left(), r.top(), r.width(), r.height()),
        // Detached and `display: none` elements have no offset parent.
        visible: element.is_connected() && element.offset_parent().is_some(),
        element,
    }
}
