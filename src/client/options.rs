//! Per-element client configuration from the markup contract
//!
//! An input element activates suggestion behavior by declaring
//! `data-autocomplete` with the endpoint URL. The remaining attributes
//! tune debouncing, term splitting, selection side effects, and the
//! rendered list's styling.

use super::params::ParamExpr;
use crate::{DEFAULT_DELAY_MS, DEFAULT_MIN_CHARS};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::warn;

/// Parsed per-element options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Suggestion endpoint URL.
    pub endpoint: String,
    /// Minimum active-term length before a request is issued.
    pub min_chars: usize,
    /// Multi-term delimiter; `None` treats the whole input as one term.
    pub delimiter: Option<String>,
    /// Debounce delay.
    pub delay: Duration,
    /// Companion field selector receiving the selected suggestion's id.
    pub id_element: Option<String>,
    /// Name of a registered on-select hook.
    pub on_select: Option<String>,
    /// Submit the enclosing form after a selection.
    pub submit_on_select: bool,
    /// Extra request parameters.
    pub extra_params: BTreeMap<String, ParamExpr>,
    /// Style overrides for the rendered suggestion list.
    pub result_list_style: Option<ResultListStyle>,
}

impl ClientOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            min_chars: DEFAULT_MIN_CHARS,
            delimiter: None,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            id_element: None,
            on_select: None,
            submit_on_select: false,
            extra_params: BTreeMap::new(),
            result_list_style: None,
        }
    }

    /// Parse element attributes. Returns `None` when the element does not
    /// declare `data-autocomplete` or opts out via
    /// `autocomplete_disabled`.
    pub fn from_attrs(attrs: &HashMap<String, String>) -> Option<Self> {
        let endpoint = attrs.get("data-autocomplete")?;
        if attrs
            .get("autocomplete_disabled")
            .map(|v| v == "true")
            .unwrap_or(false)
        {
            return None;
        }

        let mut options = Self::new(endpoint);

        if let Some(raw) = attrs.get("data-min-chars") {
            if let Ok(min_chars) = raw.parse() {
                options.min_chars = min_chars;
            }
        }
        if let Some(delimiter) = attrs.get("data-delimiter") {
            options.delimiter = Some(delimiter.clone());
        }
        if let Some(raw) = attrs.get("delay") {
            if let Ok(ms) = raw.parse() {
                options.delay = Duration::from_millis(ms);
            }
        }
        options.id_element = attrs.get("id_element").cloned();
        options.on_select = attrs.get("on_select").cloned();
        options.submit_on_select = attrs
            .get("submit_on_select")
            .map(|v| v == "true")
            .unwrap_or(false);

        if let Some(raw) = attrs.get("data-extra-params") {
            match serde_json::from_str::<BTreeMap<String, String>>(raw) {
                Ok(params) => {
                    options.extra_params = params
                        .into_iter()
                        .map(|(k, v)| (k, ParamExpr::parse(&v)))
                        .collect();
                }
                Err(e) => warn!("ignoring malformed data-extra-params: {}", e),
            }
        }

        options.result_list_style = ResultListStyle::from_attrs(attrs);

        Some(options)
    }
}

/// Style overrides for the suggestion list container
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultListStyle {
    #[serde(default)]
    pub ul: BTreeMap<String, String>,
    #[serde(default)]
    pub li: BTreeMap<String, String>,
    #[serde(default, rename = "a")]
    pub anchor: BTreeMap<String, String>,
    /// Selector of the container the list is relocated into.
    #[serde(skip)]
    pub append_to: Option<String>,
}

impl ResultListStyle {
    fn from_attrs(attrs: &HashMap<String, String>) -> Option<Self> {
        let append_to = attrs.get("data-append-to").cloned();
        let mut style = match attrs.get("result_list_css") {
            Some(raw) => match serde_json::from_str::<ResultListStyle>(raw) {
                Ok(style) => style,
                Err(e) => {
                    warn!("ignoring malformed result_list_css: {}", e);
                    ResultListStyle::default()
                }
            },
            None if append_to.is_some() => ResultListStyle::default(),
            None => return None,
        };
        style.append_to = append_to;
        Some(style)
    }

    /// List-container css with the relocation rule applied: a list
    /// appended to another element must not keep relative positioning.
    pub fn effective_ul(&self) -> BTreeMap<String, String> {
        let mut ul = self.ul.clone();
        if self.append_to.is_some() {
            ul.entry("position".to_string())
                .or_insert_with(|| "static".to_string());
        }
        ul
    }
}
