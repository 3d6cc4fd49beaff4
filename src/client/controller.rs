//! Per-element suggestion controller
//!
//! State machine: `Idle → Debouncing → AwaitingResponse → Idle`. Every
//! keystroke bumps a generation counter and restarts the debounce timer;
//! a timer or response belonging to an older generation gives up when it
//! wakes, so at most the most recent request's result is ever rendered.

use super::options::{ClientOptions, ResultListStyle};
use super::params::EvalContext;
use super::transport::SuggestionTransport;
use crate::results::Suggestion;
use crate::term;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Controller lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    AwaitingResponse,
}

/// Side effects the controller drives on its host
pub trait Ui: Send + Sync {
    /// Show the suggestion list.
    fn render(&self, suggestions: &[Suggestion]);
    /// Hide/empty the suggestion list.
    fn clear_suggestions(&self);
    /// Rewrite the input element's value.
    fn set_input_value(&self, value: &str);
    /// Write the selected suggestion's id into the companion field.
    fn set_companion_value(&self, selector: &str, id: &str);
    /// Fire a change notification on the companion field.
    fn notify_change(&self, selector: &str);
    /// Submit the enclosing form.
    fn submit_form(&self);
    /// Apply list style overrides before rendering.
    fn apply_list_style(&self, _style: &ResultListStyle) {}
}

type SelectHook = Arc<dyn Fn(&Suggestion) + Send + Sync>;

/// Named on-select callbacks. Hook names in markup resolve here; nothing
/// is ever evaluated as code.
#[derive(Clone, Default)]
pub struct SelectHooks {
    hooks: HashMap<String, SelectHook>,
}

impl SelectHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Suggestion) + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
        self
    }

    fn get(&self, name: &str) -> Option<&SelectHook> {
        self.hooks.get(name)
    }
}

struct Shared {
    phase: Mutex<Phase>,
    suggestions: Mutex<Vec<Suggestion>>,
}

/// One input element's suggestion controller. Created on first activation
/// of the element and dropped with it; holds no process-wide state.
pub struct Controller {
    options: ClientOptions,
    transport: Arc<dyn SuggestionTransport>,
    ui: Arc<dyn Ui>,
    context: EvalContext,
    hooks: SelectHooks,
    generation: Arc<AtomicU64>,
    shared: Arc<Shared>,
}

impl Controller {
    pub fn new(
        options: ClientOptions,
        transport: Arc<dyn SuggestionTransport>,
        ui: Arc<dyn Ui>,
    ) -> Self {
        Self {
            options,
            transport,
            ui,
            context: EvalContext::new(),
            hooks: SelectHooks::new(),
            generation: Arc::new(AtomicU64::new(0)),
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Idle),
                suggestions: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_context(mut self, context: EvalContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_hooks(mut self, hooks: SelectHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn phase(&self) -> Phase {
        *lock(&self.shared.phase)
    }

    /// The most recently rendered suggestion list.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        lock(&self.shared.suggestions).clone()
    }

    /// Handle one keystroke: supersede any outstanding timer or request
    /// and restart the debounce delay for the new input value.
    pub fn keystroke(&self, value: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.shared.phase) = Phase::Debouncing;

        let options = self.options.clone();
        let transport = Arc::clone(&self.transport);
        let ui = Arc::clone(&self.ui);
        let context = self.context.clone();
        let current = Arc::clone(&self.generation);
        let shared = Arc::clone(&self.shared);
        let value = value.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(options.delay).await;
            if current.load(Ordering::SeqCst) != generation {
                // A newer keystroke restarted the debounce.
                return;
            }

            let term = term::active_term(&value, options.delimiter.as_deref());
            if term.chars().count() < options.min_chars {
                lock(&shared.suggestions).clear();
                ui.clear_suggestions();
                *lock(&shared.phase) = Phase::Idle;
                return;
            }

            *lock(&shared.phase) = Phase::AwaitingResponse;

            let mut params: BTreeMap<String, String> = options
                .extra_params
                .iter()
                .map(|(k, expr)| (k.clone(), expr.resolve(&context)))
                .collect();
            params.insert("term".to_string(), term);

            let result = transport.fetch(&options.endpoint, &params).await;

            if current.load(Ordering::SeqCst) != generation {
                debug!("discarding stale suggestion response");
                return;
            }

            match result {
                Ok(suggestions) => {
                    if let Some(style) = &options.result_list_style {
                        ui.apply_list_style(style);
                    }
                    ui.render(&suggestions);
                    *lock(&shared.suggestions) = suggestions;
                }
                Err(err) => {
                    warn!("suggestion request failed: {}", err);
                }
            }
            *lock(&shared.phase) = Phase::Idle;
        });
    }

    /// Apply a selection: rewrite the input, then run the configured
    /// selection side effects. The companion id field is only written in
    /// single-term mode; with a delimiter the input keeps accepting terms
    /// and no single id describes it.
    pub fn select(&self, suggestion: &Suggestion, current_value: &str) -> String {
        let delimiter = self.options.delimiter.as_deref();
        let terms = term::split(current_value, delimiter);
        let value = term::recombine(&terms, &suggestion.value, delimiter);
        self.ui.set_input_value(&value);

        if delimiter.is_none() {
            if let Some(selector) = &self.options.id_element {
                self.ui.set_companion_value(selector, &suggestion.id);
                self.ui.notify_change(selector);
            }
        }

        if let Some(name) = &self.options.on_select {
            match self.hooks.get(name) {
                Some(hook) => hook(suggestion),
                None => warn!("no registered on-select hook named {:?}", name),
            }
        }

        if self.options.submit_on_select {
            self.ui.submit_form();
        }

        value
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
