//! Event Dispatcher
//!
//! A FIFO queue of [`Event`]s delivered to subscribers one at a time.
//! Subscribers are widgets in a [`Scene`] or free-standing [`Listener`]s;
//! both subscribe per [`EventKind`] and receive events in subscription
//! order. Whatever a subscriber returns is appended to the queue.
//!
//! # Tick cycle
//!
//! ```text
//! run_tick(dt)
//!   ├─ QueueStarted            (first tick only)
//!   ├─ Tick(dt)                ──► animations, menus, counters, listeners
//!   ├─ drain follow-ups        (ContentUpdated, sounds, custom events...)
//!   ├─ Service(TickBoundary)   ──► layouts recomposite and push
//!   ├─ drain follow-ups
//!   └─ backend.refresh()
//! ```
//!
//! Handlers run to completion before the next event is delivered, so a
//! layout handling the tick boundary always sees every change made during
//! the tick.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Duration;

use crate::backend::DisplayBackend;
use crate::config::DispatcherConfig;
use crate::events::{Event, EventKind, MiscInput, ServiceEvent};
use crate::scene::{Scene, WidgetId};

// =============================================================================
// Listeners
// =============================================================================

/// Something that reacts to events but is not a widget
pub trait Listener {
    /// Handle one event, returning any events to queue
    fn on_event(&mut self, event: &Event) -> Vec<Event>;
}

/// Handle to a listener registered with a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Turns a window close into an orderly shutdown
///
/// On `Close` it emits `ShutdownReady` so widgets can save state, then
/// emits `Shutdown` on the second `Tick` it receives. A `Tick` delivered in
/// the same [`EventDispatcher::run_tick`] as the `Close` counts as the first
/// one, so `Shutdown` comes out of the following `run_tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingListener {
    countdown: u32,
    counting: bool,
}

impl ClosingListener {
    /// Ticks between `ShutdownReady` and `Shutdown`
    pub const COUNTDOWN: u32 = 2;

    /// A listener that has not seen `Close` yet
    #[must_use]
    pub const fn new() -> Self {
        Self {
            countdown: Self::COUNTDOWN,
            counting: false,
        }
    }

    /// Event kinds this listener needs
    pub const KINDS: [EventKind; 2] = [EventKind::MiscInput, EventKind::Tick];
}

impl Default for ClosingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for ClosingListener {
    fn on_event(&mut self, event: &Event) -> Vec<Event> {
        match event {
            Event::MiscInput(MiscInput::Close) if !self.counting => {
                self.counting = true;
                vec![Event::Service(ServiceEvent::ShutdownReady)]
            }
            Event::Tick(_) if self.counting && self.countdown > 0 => {
                self.countdown -= 1;
                if self.countdown == 0 {
                    vec![Event::Service(ServiceEvent::Shutdown)]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }
}

/// Logs every event it receives at `info` level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingListener {
    seen: u64,
}

impl LoggingListener {
    /// A fresh listener
    #[must_use]
    pub const fn new() -> Self {
        Self { seen: 0 }
    }

    /// Number of events logged so far
    #[must_use]
    pub const fn seen(&self) -> u64 {
        self.seen
    }
}

impl Listener for LoggingListener {
    fn on_event(&mut self, event: &Event) -> Vec<Event> {
        self.seen += 1;
        tracing::info!(kind = ?event.kind(), event = ?event, "Event");
        Vec::new()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscriber {
    Widget(WidgetId),
    Listener(ListenerId),
}

/// Queue plus subscription table
pub struct EventDispatcher {
    queue: VecDeque<Event>,
    subscriptions: HashMap<EventKind, Vec<Subscriber>>,
    listeners: HashMap<ListenerId, Box<dyn Listener>>,
    next_listener: u32,
    max_passes: usize,
    started: bool,
    shutdown: bool,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("queued", &self.queue.len())
            .field("listeners", &self.listeners.len())
            .field("max_passes", &self.max_passes)
            .field("shutdown", &self.shutdown)
            .finish_non_exhaustive()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(&DispatcherConfig::default())
    }
}

impl EventDispatcher {
    /// An empty dispatcher
    #[must_use]
    pub fn new(config: &DispatcherConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            subscriptions: HashMap::new(),
            listeners: HashMap::new(),
            next_listener: 1,
            max_passes: config.max_passes.max(1),
            started: false,
            shutdown: false,
        }
    }

    fn add_subscription(&mut self, subscriber: Subscriber, kinds: &[EventKind]) {
        for kind in kinds {
            let subscribers = self.subscriptions.entry(*kind).or_default();
            if !subscribers.contains(&subscriber) {
                subscribers.push(subscriber);
            }
        }
    }

    fn remove_subscription(&mut self, subscriber: Subscriber, kinds: &[EventKind]) {
        for kind in kinds {
            if let Some(subscribers) = self.subscriptions.get_mut(kind) {
                subscribers.retain(|s| *s != subscriber);
            }
        }
    }

    /// Deliver events of `kinds` to `widget`
    ///
    /// Subscribing twice to the same kind has no effect.
    pub fn subscribe(&mut self, widget: WidgetId, kinds: &[EventKind]) {
        self.add_subscription(Subscriber::Widget(widget), kinds);
        tracing::debug!(widget = %widget, ?kinds, "Widget subscribed");
    }

    /// Deliver every kind of event to `widget`
    pub fn subscribe_all(&mut self, widget: WidgetId) {
        self.subscribe(widget, &EventKind::ALL);
    }

    /// Stop delivering `kinds` to `widget`
    pub fn unsubscribe(&mut self, widget: WidgetId, kinds: &[EventKind]) {
        self.remove_subscription(Subscriber::Widget(widget), kinds);
    }

    /// Register a listener for `kinds`
    pub fn add_listener(&mut self, listener: Box<dyn Listener>, kinds: &[EventKind]) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, listener);
        self.add_subscription(Subscriber::Listener(id), kinds);
        tracing::debug!(listener = %id, ?kinds, "Listener registered");
        id
    }

    /// Drop a listener and all its subscriptions
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn Listener>> {
        self.remove_subscription(Subscriber::Listener(id), &EventKind::ALL);
        self.listeners.remove(&id)
    }

    /// Queue one event
    pub fn add_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Queue the `QueueStarted` service event
    pub fn start_queue(&mut self) {
        self.started = true;
        self.add_event(Event::Service(ServiceEvent::QueueStarted));
    }

    /// Number of events waiting
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether a `Shutdown` service event has been dispatched
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Deliver the events queued right now, in order
    ///
    /// Events returned by subscribers are queued but not delivered in this
    /// call. A subscriber that fails is logged and skipped; the others
    /// still receive the event. Returns the number of events delivered.
    pub fn dispatch<B: DisplayBackend>(&mut self, scene: &mut Scene<B>) -> usize {
        let count = self.queue.len();
        for _ in 0..count {
            let Some(event) = self.queue.pop_front() else {
                break;
            };
            self.deliver(scene, &event);
        }
        count
    }

    fn deliver<B: DisplayBackend>(&mut self, scene: &mut Scene<B>, event: &Event) {
        if matches!(event, Event::Service(ServiceEvent::Shutdown)) {
            tracing::info!("Shutdown event dispatched");
            self.shutdown = true;
        }
        let subscribers = self
            .subscriptions
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        for subscriber in subscribers {
            let produced = match subscriber {
                Subscriber::Widget(id) => match scene.handle_event(id, event) {
                    Ok(produced) => produced,
                    Err(error) => {
                        tracing::warn!(widget = %id, kind = ?event.kind(), %error, "Event handler failed");
                        continue;
                    }
                },
                Subscriber::Listener(id) => match self.listeners.get_mut(&id) {
                    Some(listener) => listener.on_event(event),
                    None => continue,
                },
            };
            self.queue.extend(produced);
        }
    }

    /// Drain follow-up events, at most `max_passes` batches
    fn drain<B: DisplayBackend>(&mut self, scene: &mut Scene<B>) {
        for _ in 0..self.max_passes {
            if self.queue.is_empty() {
                return;
            }
            self.dispatch(scene);
        }
        if !self.queue.is_empty() {
            tracing::warn!(
                pending = self.queue.len(),
                max_passes = self.max_passes,
                "Event cascade did not settle; leftovers wait for the next tick"
            );
        }
    }

    /// Run one full tick cycle with `dt` elapsed since the last one
    pub fn run_tick<B: DisplayBackend>(&mut self, scene: &mut Scene<B>, dt: Duration) {
        if !self.started {
            self.start_queue();
        }
        self.add_event(Event::Tick(dt));
        self.drain(scene);
        self.add_event(Event::Service(ServiceEvent::TickBoundary));
        self.drain(scene);
        scene.backend_mut().refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::backend::HeadlessBackend;
    use crate::tile::{Color, Pos, Size, Tile, TileGrid};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records what it sees and optionally answers every event once
    struct Recorder {
        seen: Rc<RefCell<Vec<Event>>>,
        reply: Option<Event>,
    }

    impl Listener for Recorder {
        fn on_event(&mut self, event: &Event) -> Vec<Event> {
            self.seen.borrow_mut().push(event.clone());
            self.reply.take().into_iter().collect()
        }
    }

    fn recorder(reply: Option<Event>) -> (Box<Recorder>, Rc<RefCell<Vec<Event>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        (
            Box::new(Recorder {
                seen: Rc::clone(&seen),
                reply,
            }),
            seen,
        )
    }

    fn scene() -> Scene<HeadlessBackend> {
        Scene::new(HeadlessBackend::new(Size::new(10, 10)))
    }

    #[test]
    fn test_dispatch_only_drains_current_events() {
        let mut scene = scene();
        let mut dispatcher = EventDispatcher::default();
        let (listener, seen) = recorder(Some(Event::custom("reply")));
        dispatcher.add_listener(listener, &EventKind::ALL);

        dispatcher.add_event(Event::custom("first"));
        assert_eq!(dispatcher.dispatch(&mut scene), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(dispatcher.pending(), 1);

        dispatcher.dispatch(&mut scene);
        assert_eq!(seen.borrow()[1], Event::custom("reply"));
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn test_subscriptions_filter_by_kind() {
        let mut scene = scene();
        let mut dispatcher = EventDispatcher::default();
        let (listener, seen) = recorder(None);
        let id = dispatcher.add_listener(listener, &[EventKind::KeyDown]);

        dispatcher.add_event(Event::Tick(Duration::from_millis(10)));
        dispatcher.add_event(Event::KeyDown(crate::events::Key::Enter));
        dispatcher.dispatch(&mut scene);
        assert_eq!(seen.borrow().len(), 1);

        assert!(dispatcher.remove_listener(id).is_some());
        dispatcher.add_event(Event::KeyDown(crate::events::Key::Enter));
        dispatcher.dispatch(&mut scene);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_run_tick_order() {
        let mut scene = scene();
        let mut dispatcher = EventDispatcher::default();
        let (listener, seen) = recorder(None);
        dispatcher.add_listener(listener, &EventKind::ALL);

        dispatcher.run_tick(&mut scene, Duration::from_millis(20));
        assert_eq!(
            *seen.borrow(),
            vec![
                Event::Service(ServiceEvent::QueueStarted),
                Event::Tick(Duration::from_millis(20)),
                Event::Service(ServiceEvent::TickBoundary),
            ]
        );
        assert_eq!(scene.backend().refresh_count(), 1);
    }

    #[test]
    fn test_tick_boundary_sees_animation_frame() {
        let mut scene = scene();
        let mut dispatcher = EventDispatcher::default();
        let frames = ['a', 'b']
            .iter()
            .map(|c| TileGrid::filled(Size::new(1, 1), Tile::new(*c, Color::WHITE, Color::BLACK)))
            .collect();
        let anim = scene.create_animation(Animation::new(frames, 10.0).unwrap(), true);
        let layout = scene.create_layout(TileGrid::blank(Size::new(3, 3)));
        scene.add_child(layout, anim, Pos::new(1, 1)).unwrap();
        scene.attach(layout, Pos::ORIGIN, 0).unwrap();

        dispatcher.subscribe(anim, &[EventKind::Tick]);
        dispatcher.subscribe(layout, &[EventKind::Service, EventKind::ContentUpdated]);

        dispatcher.run_tick(&mut scene, Duration::from_millis(100));
        let screen = scene.backend().snapshot();
        assert_eq!(screen.get(Pos::new(1, 1)).unwrap().ch, 'b');
    }

    #[test]
    fn test_failing_widget_does_not_stop_others() {
        let mut scene = scene();
        let mut dispatcher = EventDispatcher::default();
        dispatcher.subscribe(WidgetId::from_raw(9999), &[EventKind::Custom]);
        let (listener, seen) = recorder(None);
        dispatcher.add_listener(listener, &[EventKind::Custom]);

        dispatcher.add_event(Event::custom("ping"));
        dispatcher.dispatch(&mut scene);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_cascade_is_bounded() {
        struct Echo;
        impl Listener for Echo {
            fn on_event(&mut self, event: &Event) -> Vec<Event> {
                vec![event.clone()]
            }
        }

        let mut scene = scene();
        let mut dispatcher = EventDispatcher::new(&DispatcherConfig { max_passes: 3 });
        dispatcher.add_listener(Box::new(Echo), &[EventKind::Custom]);
        dispatcher.add_event(Event::custom("loop"));
        dispatcher.run_tick(&mut scene, Duration::ZERO);
        // still echoing, but the tick finished
        assert_eq!(dispatcher.pending(), 1);
    }

    #[test]
    fn test_closing_listener_shuts_down_on_second_tick() {
        let mut scene = scene();
        let mut dispatcher = EventDispatcher::default();
        dispatcher.add_listener(Box::new(ClosingListener::new()), &ClosingListener::KINDS);
        let (listener, seen) = recorder(None);
        dispatcher.add_listener(listener, &[EventKind::Service]);

        dispatcher.run_tick(&mut scene, Duration::from_millis(10));
        dispatcher.add_event(Event::MiscInput(MiscInput::Close));
        // Close and the first counted tick share this cycle
        dispatcher.run_tick(&mut scene, Duration::from_millis(10));
        assert!(seen
            .borrow()
            .contains(&Event::Service(ServiceEvent::ShutdownReady)));
        assert!(!dispatcher.is_shutdown());

        dispatcher.run_tick(&mut scene, Duration::from_millis(10));
        assert!(dispatcher.is_shutdown());
    }

    #[test]
    fn test_closing_countdown_only_counts_ticks_after_close() {
        let mut listener = ClosingListener::new();
        assert!(listener.on_event(&Event::Tick(Duration::from_millis(10))).is_empty());

        assert_eq!(
            listener.on_event(&Event::MiscInput(MiscInput::Close)),
            vec![Event::Service(ServiceEvent::ShutdownReady)]
        );
        // a second Close does not restart anything
        assert!(listener.on_event(&Event::MiscInput(MiscInput::Close)).is_empty());
        assert!(listener.on_event(&Event::Tick(Duration::from_millis(10))).is_empty());
        assert_eq!(
            listener.on_event(&Event::Tick(Duration::from_millis(10))),
            vec![Event::Service(ServiceEvent::Shutdown)]
        );
        assert!(listener.on_event(&Event::Tick(Duration::from_millis(10))).is_empty());
    }

    #[test]
    fn test_logging_listener_counts() {
        let mut listener = LoggingListener::new();
        listener.on_event(&Event::custom("a"));
        listener.on_event(&Event::Tick(Duration::ZERO));
        assert_eq!(listener.seen(), 2);
    }
}
