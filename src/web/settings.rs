//! The host's settings dialog (`app.ui.settings`) as a [`SettingsStore`].
//!
//! Values cross the boundary as JSON text so both sides keep their own
//! representation.

use js_sys::{Array, Function, JSON, Object, Reflect};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::settings::{ChangeCallback, SettingDescriptor, SettingKind, SettingsStore, StoreError};

fn rejected(e: &JsValue) -> StoreError {
    StoreError::Rejected(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

fn to_js(value: &Value) -> Result<JsValue, StoreError> {
    let text = serde_json::to_string(value).map_err(|e| StoreError::Rejected(e.to_string()))?;
    JSON::parse(&text).map_err(|e| rejected(&e))
}

fn from_js(value: &JsValue) -> Result<Value, StoreError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text: String = JSON::stringify(value).map_err(|e| rejected(&e))?.into();
    serde_json::from_str(&text).map_err(|e| StoreError::Rejected(e.to_string()))
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), StoreError> {
    Reflect::set(target, &JsValue::from_str(key), value).map_err(|e| rejected(&e))?;
    Ok(())
}

pub struct JsSettings {
    settings: Option<JsValue>,
}

impl JsSettings {
    /// Bind to `app.ui.settings`. A missing store is not an error here; each
    /// call reports it and callers fall back to defaults.
    pub fn from_app(app: &JsValue) -> Self {
        let settings = match Reflect::get(app, &JsValue::from_str("ui"))
            .and_then(|ui| Reflect::get(&ui, &JsValue::from_str("settings")))
        {
            Ok(s) if s.is_object() => Some(s),
            _ => None,
        };
        Self { settings }
    }

    fn call(&self, method: &str, args: &Array) -> Result<JsValue, StoreError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("app.ui.settings is missing".to_owned()))?;
        let function = Reflect::get(settings, &JsValue::from_str(method))
            .map_err(|e| rejected(&e))?
            .dyn_into::<Function>()
            .map_err(|_| StoreError::Unavailable(format!("settings.{method} is not a function")))?;
        function.apply(settings, args).map_err(|e| rejected(&e))
    }
}

fn descriptor_object(descriptor: &SettingDescriptor) -> Result<Object, StoreError> {
    let obj = Object::new();
    set(&obj, "id", &JsValue::from_str(descriptor.id))?;
    set(&obj, "name", &JsValue::from_str(descriptor.name))?;
    set(&obj, "tooltip", &JsValue::from_str(descriptor.tooltip))?;
    set(&obj, "category", &Array::of2(&descriptor.category.into(), &descriptor.name.into()))?;
    set(&obj, "defaultValue", &to_js(&descriptor.default)?)?;

    let kind = match &descriptor.kind {
        SettingKind::Slider { min, max, step } => {
            let attrs = Object::new();
            set(&attrs, "min", &JsValue::from_f64(*min))?;
            set(&attrs, "max", &JsValue::from_f64(*max))?;
            set(&attrs, "step", &JsValue::from_f64(*step))?;
            set(&obj, "attrs", &attrs)?;
            "slider"
        }
        SettingKind::Color => "color",
        SettingKind::Combo { options } => {
            let list: Array = options.iter().map(|o| JsValue::from_str(o)).collect();
            set(&obj, "options", &list)?;
            "combo"
        }
        SettingKind::Toggle => "boolean",
        SettingKind::Text => "text",
    };
    set(&obj, "type", &JsValue::from_str(kind))?;
    Ok(obj)
}

impl SettingsStore for JsSettings {
    fn get(&self, id: &str, default: &Value) -> Result<Value, StoreError> {
        let value = self.call("getSettingValue", &Array::of2(&JsValue::from_str(id), &to_js(default)?))?;
        from_js(&value)
    }

    fn register(&mut self, descriptor: &SettingDescriptor, mut on_change: ChangeCallback) -> Result<(), StoreError> {
        let obj = descriptor_object(descriptor)?;
        let id = descriptor.id;
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| match from_js(&raw) {
            Ok(value) => on_change(&value),
            Err(e) => log::warn!("unreadable value for {id}: {e}"),
        });
        set(&obj, "onChange", callback.as_ref())?;
        self.call("addSetting", &Array::of1(&obj))?;
        // The host keeps the callback for the page's lifetime.
        callback.forget();
        Ok(())
    }
}
