//! Component Controller
//!
//! One controller per server-rendered component. It owns the action queue,
//! the in-flight batch, the listener registry and the component's data; the
//! document, timers and transport are borrowed from the session for the
//! duration of each call through [`Env`].

use meld_dom::{Document, Event, NodeId, SimpleSelector};
use serde_json::{Map, Value};

use crate::action::{ActionEntry, ActionQueue, Batch};
use crate::element::{Element, DEFAULT_DEBOUNCE};
use crate::listeners::ListenerRegistry;
use crate::loading;
use crate::message::{ComponentArgs, InboundResponse, InitAck, OutboundMessage};
use crate::patch::Patch;
use crate::timer::{TimerId, TimerManager};
use crate::transport::{self, events, Transport};
use crate::{MeldConfig, MeldError};

/// Request/response state of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Work scheduled on the session's timer manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Debounce elapsed for the component with this id
    Send(String),
    /// Poll interval tick
    Poll { component: String, method: String },
}

/// Session resources lent to a controller
pub struct Env<'a> {
    pub config: &'a MeldConfig,
    pub document: &'a mut Document,
    pub timers: &'a mut TimerManager<TimerTask>,
    pub transport: &'a mut dyn Transport,
}

/// Component controller
#[derive(Debug)]
pub struct Component {
    id: String,
    name: String,
    data: Map<String, Value>,
    root: NodeId,
    queue: ActionQueue,
    current_batch: Option<Batch>,
    state: ComponentState,
    listeners: ListenerRegistry,
    debounce_timer: Option<TimerId>,
    poll_timers: Vec<TimerId>,
    /// Elements whose own loading state is set until the next response
    loading_acting: Vec<Element>,
}

/// `app.components.counter.Counter` → `counter`
fn component_name(name: &str) -> String {
    let segments: Vec<&str> = name.split('.').collect();
    match segments.len() {
        0 | 1 => name.to_string(),
        n => segments[n - 2].to_string(),
    }
}

/// Component root: the element whose id attribute equals `id`
pub fn find_root(document: &Document, config: &MeldConfig, id: &str) -> Option<NodeId> {
    document.find_matching(&SimpleSelector::attr(&config.id_attr(), id), None)
}

impl Component {
    /// Bind a controller to its root. Listeners are not attached until the
    /// first [`refresh`](Self::refresh).
    pub fn new(args: ComponentArgs, document: &Document, config: &MeldConfig) -> Result<Self, MeldError> {
        let root = find_root(document, config, &args.id).ok_or_else(|| MeldError::RootNotFound(args.id.clone()))?;

        Ok(Self {
            name: component_name(&args.name),
            id: args.id,
            data: args.data,
            root,
            queue: ActionQueue::new(),
            current_batch: None,
            state: ComponentState::Idle,
            listeners: ListenerRegistry::new(),
            debounce_timer: None,
            poll_timers: Vec::new(),
            loading_acting: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn state(&self) -> ComponentState {
        self.state
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn current_batch(&self) -> Option<&Batch> {
        self.current_batch.as_ref()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn has_pending_send(&self) -> bool {
        self.debounce_timer.is_some()
    }

    /// Rescan the root and re-arm poll timers
    pub fn refresh(&mut self, env: &mut Env<'_>) {
        self.listeners.refresh(env.document, self.root, env.config);

        for id in self.poll_timers.drain(..) {
            env.timers.clear(id);
        }
        for poll_el in &self.listeners.poll_els {
            let Some(poll) = &poll_el.poll else { continue };
            let task = TimerTask::Poll {
                component: self.id.clone(),
                method: poll.method.clone(),
            };
            self.poll_timers.push(env.timers.set_interval(task, poll.interval_ms));
        }
    }

    /// Cancel every timer this controller owns
    pub fn teardown(&mut self, timers: &mut TimerManager<TimerTask>) {
        if let Some(id) = self.debounce_timer.take() {
            timers.clear(id);
        }
        for id in self.poll_timers.drain(..) {
            timers.clear(id);
        }
    }

    /// Run a DOM event through the model, action and custom listeners
    pub fn handle_event(&mut self, env: &mut Env<'_>, event: &mut Event) -> Result<(), MeldError> {
        if let Some(element) = self.listeners.model_listener(event).cloned() {
            self.on_model_event(env, &element);
        }

        if self.listeners.listens_for(&event.event_type) {
            self.on_action_event(env, event);
        }

        let methods = self.listeners.custom_methods(&event.event_type).to_vec();
        if !methods.is_empty() {
            tracing::debug!("Custom event {:?} → {:?}", event.event_type, methods);
            for name in methods {
                self.queue.push(ActionEntry::CallMethod {
                    name,
                    message: event.detail.clone(),
                });
            }
            self.queue_message(env, DEFAULT_DEBOUNCE);
        }

        Ok(())
    }

    fn on_model_event(&mut self, env: &mut Env<'_>, element: &Element) {
        let Some(model) = &element.model else { return };
        let action = ActionEntry::sync_input(model.name.clone(), element.get_value(env.document));
        self.enqueue_model_input(env, element, action);
    }

    fn on_action_event(&mut self, env: &mut Env<'_>, event: &mut Event) {
        let target = Element::new(env.document, event.target, env.config);
        let target = if target.is_meld {
            target
        } else {
            match target.get_meld_parent(env.document, env.config) {
                Some(parent) => parent,
                None => return,
            }
        };

        let bindings = self.listeners.actions_for(&event.event_type).to_vec();
        for binding in bindings.iter().filter(|b| b.element.is_same(&target)) {
            let action = &binding.action;
            if action.is_prevent {
                event.prevent_default();
            }
            if action.is_stop {
                event.stop_propagation();
            }

            if let Some(key) = &action.key {
                let pressed = event.key.as_deref().map(str::to_lowercase);
                if pressed.as_deref() != Some(key.as_str()) {
                    continue;
                }
            }

            let debounce = if action.debounce_time == DEFAULT_DEBOUNCE {
                binding.element.debounce_time()
            } else {
                action.debounce_time
            };

            tracing::debug!("{} → {}.{}", event.event_type, self.name, action.name);
            self.handle_loading(env.document, &target);
            self.queue.push(ActionEntry::call_method(action.name.clone()));
            self.queue_message(env, debounce);
        }
    }

    /// Queue a model `SyncInput`. Deferred bindings coalesce into an already
    /// queued input of the same name and never schedule a send.
    pub fn enqueue_model_input(&mut self, env: &mut Env<'_>, element: &Element, action: ActionEntry) {
        let is_defer = element.model.as_ref().is_some_and(|m| m.is_defer);
        if is_defer {
            if let ActionEntry::SyncInput { name, value } = &action {
                if self.queue.coalesce_input(name, value) {
                    return;
                }
            }
            self.queue.push(action);
            return;
        }

        self.queue.push(action);
        self.queue_message(env, element.debounce_time());
    }

    /// (Re)start the shared debounce timer. `-1` means the configured default.
    pub fn queue_message(&mut self, env: &mut Env<'_>, debounce_time: i64) {
        if let Some(id) = self.debounce_timer.take() {
            env.timers.clear(id);
        }
        let wait = u64::try_from(debounce_time).unwrap_or(env.config.default_debounce_ms);
        self.debounce_timer = Some(env.timers.set_timeout(TimerTask::Send(self.id.clone()), wait));
    }

    /// Debounce timer fired
    pub fn on_debounce_elapsed(&mut self, env: &mut Env<'_>) -> Result<bool, MeldError> {
        self.debounce_timer = None;
        self.send_message(env)
    }

    /// Send the live queue now, cancelling any pending debounce
    pub fn flush(&mut self, env: &mut Env<'_>) -> Result<bool, MeldError> {
        if let Some(id) = self.debounce_timer.take() {
            env.timers.clear(id);
        }
        self.send_message(env)
    }

    /// Emit the live queue as one batch. Returns whether anything was sent.
    pub fn send_message(&mut self, env: &mut Env<'_>) -> Result<bool, MeldError> {
        if self.queue.is_empty() {
            return Ok(false);
        }
        if self
            .current_batch
            .as_ref()
            .is_some_and(|batch| batch.generation == self.queue.generation())
        {
            tracing::debug!("Batch {} for {} already in flight", self.queue.generation(), self.id);
            return Ok(false);
        }

        let message = OutboundMessage {
            id: self.id.clone(),
            action_queue: self.queue.entries().to_vec(),
            component_name: self.name.clone(),
            data: self.data.clone(),
            render_dom: env.config.render_dom,
        };
        transport::emit_json(env.transport, events::MESSAGE, &message)?;

        let batch = self.queue.take();
        tracing::debug!("Sent {} actions for component {}", batch.entries.len(), self.id);
        self.current_batch = Some(batch);
        self.state = ComponentState::AwaitingResponse;
        Ok(true)
    }

    /// Poll tick: call `method` immediately
    pub fn fire_poll(&mut self, env: &mut Env<'_>, method: &str) -> Result<bool, MeldError> {
        tracing::trace!("Polling {}.{}", self.name, method);
        self.queue.push(ActionEntry::call_method(method));
        self.flush(env)
    }

    /// Loading dispatch for an action fired on `target`
    pub fn handle_loading(&mut self, document: &mut Document, target: &Element) {
        loading::apply_loading(&self.listeners, document, self.root, target);
        if target.loading.is_some() && !self.loading_acting.iter().any(|e| e.is_same(target)) {
            self.loading_acting.push(target.clone());
        }
    }

    /// Put every loading indicator and acting element back at rest
    pub fn revert_loading(&mut self, document: &mut Document) {
        let acting = std::mem::take(&mut self.loading_acting);
        loading::revert_loading(&self.listeners, document, &acting);
    }

    /// Shallow-merge a JSON object string into the component data
    pub fn merge_data(&mut self, raw: &str) -> Result<(), MeldError> {
        let incoming: Map<String, Value> = serde_json::from_str(raw).map_err(MeldError::MalformedData)?;
        self.data.extend(incoming);
        Ok(())
    }

    /// Server-declared custom event listeners from the init ack
    pub fn add_custom_listeners(&mut self, ack: InitAck) {
        self.listeners.add_custom_listeners(ack);
    }

    /// Response received without anything to apply
    pub fn mark_idle(&mut self) {
        self.state = ComponentState::Idle;
        self.current_batch = None;
    }

    /// Merge data, patch the root with the rendered fragment and rebind
    pub fn apply_response(
        &mut self,
        env: &mut Env<'_>,
        patcher: &mut dyn Patch,
        response: &InboundResponse,
    ) -> Result<(), MeldError> {
        self.mark_idle();
        self.revert_loading(env.document);

        if let Some(raw) = &response.data {
            self.merge_data(raw)?;
        }

        if let Some(fragment) = &response.dom {
            self.root = self.resolve_root(env)?;
            patcher.apply(env.document, self.root, fragment)?;
        }

        self.root = self.resolve_root(env)?;
        self.refresh(env);
        Ok(())
    }

    fn resolve_root(&self, env: &Env<'_>) -> Result<NodeId, MeldError> {
        find_root(&*env.document, env.config, &self.id).ok_or_else(|| MeldError::RootNotFound(self.id.clone()))
    }
}
