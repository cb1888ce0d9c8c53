//! Session Registry
//!
//! Owns the live document, timers, transport and patcher, keeps one
//! controller per component id, and routes inbound transport events.

use std::collections::HashMap;
use std::time::Duration;

use meld_dom::{Document, Event};
use serde_json::Value;
use url::Url;

use crate::component::{Component, Env, TimerTask};
use crate::message::{ComponentArgs, CustomEventPayload, InboundResponse, InitAck};
use crate::patch::Patch;
use crate::timer::TimerManager;
use crate::transport::{events, Transport};
use crate::{MeldConfig, MeldError};

/// Why an inbound response was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No payload at all
    Empty,
    /// The server reported an error
    Error,
    /// No controller with that id
    UnknownComponent,
    /// New actions were queued while the batch was in flight
    StaleQueue,
}

/// Result of handling a `meld-response`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Dropped(DropReason),
    Redirected(Url),
    Applied,
}

/// The client runtime for one page
pub struct Session<T: Transport, P: Patch> {
    config: MeldConfig,
    document: Document,
    timers: TimerManager<TimerTask>,
    transport: T,
    patcher: P,
    components: Vec<Component>,
    index: HashMap<String, usize>,
    location: Option<Url>,
}

impl<T: Transport, P: Patch> Session<T, P> {
    pub fn new(config: MeldConfig, document: Document, transport: T, patcher: P) -> Self {
        Self {
            config,
            document,
            timers: TimerManager::new(),
            transport,
            patcher,
            components: Vec::new(),
            index: HashMap::new(),
            location: None,
        }
    }

    pub fn config(&self) -> &MeldConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.index.get(id).map(|&i| &self.components[i])
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Navigation target set by the last redirect
    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Split into the controller list, the borrowed environment and the patcher
    fn split(&mut self) -> (&mut [Component], Env<'_>, &mut P) {
        (
            self.components.as_mut_slice(),
            Env {
                config: &self.config,
                document: &mut self.document,
                timers: &mut self.timers,
                transport: &mut self.transport,
            },
            &mut self.patcher,
        )
    }

    /// Boot a component: bind listeners and announce it to the server.
    /// Re-initializing an id replaces its controller.
    pub fn component_init(&mut self, args: ComponentArgs) -> Result<&Component, MeldError> {
        let id = args.id.clone();
        let mut component = Component::new(args, &self.document, &self.config)?;

        let (_, mut env, _) = self.split();
        component.refresh(&mut env);
        if let Err(err) = env.transport.emit(events::INIT, Value::String(id.clone())) {
            component.teardown(env.timers);
            return Err(err.into());
        }

        let slot = match self.index.get(&id).copied() {
            Some(i) => {
                tracing::debug!("Replacing component {}", id);
                self.components[i].teardown(&mut self.timers);
                self.components[i] = component;
                i
            }
            None => {
                self.components.push(component);
                let i = self.components.len() - 1;
                self.index.insert(id.clone(), i);
                i
            }
        };

        tracing::info!("Initialized component {} ({})", id, self.components[slot].name());
        Ok(&self.components[slot])
    }

    /// Boot from the JSON args embedded in the page
    pub fn component_init_json(&mut self, args: &str) -> Result<&Component, MeldError> {
        let args: ComponentArgs = serde_json::from_str(args).map_err(MeldError::MalformedData)?;
        self.component_init(args)
    }

    /// `meld-init` acknowledgement for component `id`
    pub fn on_init_ack(&mut self, id: &str, ack: InitAck) {
        match self.index.get(id) {
            Some(&i) => self.components[i].add_custom_listeners(ack),
            None => tracing::debug!("Init ack for unknown component {}", id),
        }
    }

    /// Deliver a DOM event to every controller whose root contains its
    /// target. Custom events (targeting the document) reach all of them.
    pub fn dispatch(&mut self, event: &mut Event) -> Result<(), MeldError> {
        let (components, mut env, _) = self.split();
        let document_node = env.document.tree.root();
        for component in components.iter_mut() {
            let in_scope = event.target == document_node || env.document.tree.contains(component.root(), event.target);
            if !in_scope {
                continue;
            }
            component.handle_event(&mut env, event)?;
            if event.is_propagation_stopped() {
                break;
            }
        }
        Ok(())
    }

    /// Advance the virtual clock by `ms`, firing everything that falls due
    pub fn advance(&mut self, ms: u64) -> Result<(), MeldError> {
        let until = self.timers.now().saturating_add(ms);
        while let Some((_, task)) = self.timers.pop_due(until) {
            self.run_task(task)?;
        }
        self.timers.set_now(until);
        Ok(())
    }

    fn run_task(&mut self, task: TimerTask) -> Result<(), MeldError> {
        let id = match &task {
            TimerTask::Send(id) => id,
            TimerTask::Poll { component, .. } => component,
        };
        let Some(&i) = self.index.get(id) else {
            return Ok(());
        };

        let (components, mut env, _) = self.split();
        match &task {
            TimerTask::Send(_) => {
                components[i].on_debounce_elapsed(&mut env)?;
            }
            TimerTask::Poll { method, .. } => {
                components[i].fire_poll(&mut env, method)?;
            }
        }
        Ok(())
    }

    /// Wait in real time until no debounce timer is pending, firing timers as
    /// their deadlines pass. Poll intervals alone do not keep this running.
    pub async fn run_timers(&mut self) -> Result<(), MeldError> {
        while let Some(wait) = self.timers.time_until_next_timeout() {
            if wait > 0 {
                smol::Timer::after(Duration::from_millis(wait)).await;
            }
            self.advance(wait)?;
        }
        Ok(())
    }

    /// Send every component's queue immediately
    pub fn flush(&mut self) -> Result<(), MeldError> {
        let (components, mut env, _) = self.split();
        for component in components.iter_mut() {
            component.flush(&mut env)?;
        }
        Ok(())
    }

    /// Route one inbound transport event
    pub fn handle_transport_event(&mut self, event: &str, payload: Value) -> Result<(), MeldError> {
        match event {
            events::RESPONSE => {
                let response = if payload.is_null() {
                    None
                } else {
                    Some(serde_json::from_value(payload).map_err(MeldError::MalformedData)?)
                };
                self.on_response(response)?;
            }
            events::EVENT => {
                let payload = serde_json::from_value(payload).map_err(MeldError::MalformedData)?;
                self.on_custom_event(payload)?;
            }
            other => tracing::warn!("Ignoring unknown transport event {:?}", other),
        }
        Ok(())
    }

    /// Apply a `meld-response`
    pub fn on_response(&mut self, response: Option<InboundResponse>) -> Result<ResponseOutcome, MeldError> {
        let Some(response) = response else {
            return Ok(ResponseOutcome::Dropped(DropReason::Empty));
        };

        if let Some(error) = &response.error {
            tracing::error!("Component {} error: {}", response.id, error);
            if let Some(&i) = self.index.get(&response.id) {
                let component = &mut self.components[i];
                component.mark_idle();
                component.revert_loading(&mut self.document);
            }
            return Ok(ResponseOutcome::Dropped(DropReason::Error));
        }

        let Some(&i) = self.index.get(&response.id) else {
            tracing::debug!("Response for unknown component {}", response.id);
            return Ok(ResponseOutcome::Dropped(DropReason::UnknownComponent));
        };
        let component = &mut self.components[i];

        if !component.queue().is_empty() {
            tracing::debug!(
                "Dropping stale response for {}: {} actions queued",
                response.id,
                component.queue().len()
            );
            return Ok(ResponseOutcome::Dropped(DropReason::StaleQueue));
        }

        if let Some(redirect) = &response.redirect {
            component.mark_idle();
            component.revert_loading(&mut self.document);
            let base = Url::parse(self.document.url()).ok();
            let target = Url::options()
                .base_url(base.as_ref())
                .parse(&redirect.url)
                .map_err(|source| MeldError::Redirect {
                    url: redirect.url.clone(),
                    source,
                })?;
            tracing::info!("Redirecting to {}", target);
            self.document.set_url(target.as_str());
            self.location = Some(target.clone());
            return Ok(ResponseOutcome::Redirected(target));
        }

        let (components, mut env, patcher) = self.split();
        components[i].apply_response(&mut env, patcher, &response)?;
        Ok(ResponseOutcome::Applied)
    }

    /// `meld-event`: redispatch as a document-level custom event
    pub fn on_custom_event(&mut self, payload: CustomEventPayload) -> Result<(), MeldError> {
        tracing::debug!("Dispatching custom event {:?}", payload.event);
        let mut event = Event::custom(payload.event, payload.message);
        self.dispatch(&mut event)
    }
}
