//! Universal scraping (web unlocker) requests.

use crate::error::{Error, Result};
use crate::payload::{flag, FormPayload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Output formats the unlocker can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockFormat {
    #[default]
    Html,
    Png,
}

impl UnlockFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            UnlockFormat::Html => "html",
            UnlockFormat::Png => "png",
        }
    }
}

impl FromStr for UnlockFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(UnlockFormat::Html),
            "png" => Ok(UnlockFormat::Png),
            _ => Err(Error::config(format!(
                "invalid output format {s:?}; supported values are \"html\" and \"png\""
            ))),
        }
    }
}

/// A name/value pair forwarded as a request header or cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What the unlocker returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutput {
    /// Page HTML, unwrapped from the response envelope.
    Html(String),
    /// Screenshot bytes.
    Png(Vec<u8>),
}

impl UnlockOutput {
    /// The HTML, if this is an HTML result.
    pub fn as_html(&self) -> Option<&str> {
        match self {
            UnlockOutput::Html(html) => Some(html),
            UnlockOutput::Png(_) => None,
        }
    }
}

/// A request to fetch one URL through the unlocker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockRequest {
    /// Page to fetch.
    pub url: String,
    /// Render JavaScript before returning.
    pub js_render: bool,
    pub output_format: UnlockFormat,
    /// Exit country for the fetch.
    pub country: Option<String>,
    /// Resource types not to load, e.g. `image,media`.
    pub block_resources: Option<String>,
    /// Content types stripped from the result, e.g. `js,css`.
    pub clean_content: Option<String>,
    /// Fixed wait in milliseconds after load.
    pub wait: Option<u64>,
    /// CSS selector to wait for; takes priority over `wait`.
    pub wait_for: Option<String>,
    pub headers: Vec<NameValue>,
    pub cookies: Vec<NameValue>,
    /// Provider parameters not modelled above, appended after the typed fields.
    pub additional_parameters: BTreeMap<String, String>,
}

impl UnlockRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn js_render(mut self, js_render: bool) -> Self {
        self.js_render = js_render;
        self
    }

    pub fn output_format(mut self, format: UnlockFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn block_resources(mut self, resources: impl Into<String>) -> Self {
        self.block_resources = Some(resources.into());
        self
    }

    pub fn clean_content(mut self, content: impl Into<String>) -> Self {
        self.clean_content = Some(content.into());
        self
    }

    pub fn wait(mut self, millis: u64) -> Self {
        self.wait = Some(millis);
        self
    }

    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(NameValue::new(name, value));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push(NameValue::new(name, value));
        self
    }

    /// Add a provider parameter that has no typed field.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_parameters.insert(key.into(), value.into());
        self
    }

    /// Encode into the form payload of the Universal endpoint.
    pub fn to_payload(&self) -> Result<FormPayload> {
        if self.url.is_empty() {
            return Err(Error::config("url is required for universal scraping"));
        }

        let mut payload = FormPayload::new();
        payload.set("url", self.url.as_str());
        payload.set("js_render", flag(self.js_render));
        payload.set("type", self.output_format.as_str());

        payload.set_opt("country", self.country.as_deref().map(str::to_lowercase));
        payload.set_opt("block_resources", non_empty(&self.block_resources));
        payload.set_opt("clean_content", non_empty(&self.clean_content));
        payload.set_opt("wait", self.wait.map(|w| w.to_string()));
        payload.set_opt("wait_for", non_empty(&self.wait_for));
        if !self.headers.is_empty() {
            payload.set("headers", to_json(&self.headers)?);
        }
        if !self.cookies.is_empty() {
            payload.set("cookies", to_json(&self.cookies)?);
        }

        payload.extend_passthrough(&self.additional_parameters);
        Ok(payload)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn to_json(pairs: &[NameValue]) -> Result<String> {
    serde_json::to_string(pairs).map_err(|e| Error::config(format!("cannot encode {e}")))
}
