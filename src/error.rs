use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("browser call failed: {0}")]
    Js(String),

    #[error("missing page element: {0}")]
    MissingElement(&'static str),
}

impl From<JsValue> for DemoError {
    fn from(value: JsValue) -> Self {
        DemoError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<DemoError> for JsValue {
    fn from(error: DemoError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
