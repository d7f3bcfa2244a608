//! Event-loop plumbing around the layout engine.
//!
//! The engine itself is synchronous; this module supplies the asynchrony
//! around it. A calloop event loop drives pending image loads as futures on
//! its executor, each tagged with the generation of the pass that scheduled
//! it. When a load settles, the outcome is fed back into the engine, which
//! discards it if the pass has been superseded in the meantime.
//!
//! Resizes are debounced: every signal replaces the previously scheduled
//! relayout timer, so a continuous resize drag coalesces into a single pass
//! once the viewport goes quiet.

use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use async_channel::{Receiver, Sender};
use calloop::futures::Scheduler;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, RegistrationToken};
use futures_util::future::LocalBoxFuture;
use tracing::{trace, warn};

use crate::layout::{
    BitmapSize, LayoutItem, LoadError, Options, PassGeneration, Placement, Resolution, Waterfall,
};


/// Source of an image card's bitmap measurement.
///
/// `decoded` resolves when the bitmap's load-or-error event fires; both are
/// terminal. There is no timeout: a load that never settles keeps its pass
/// incomplete, which [`Runtime::complete_current_pass`] surfaces through
/// its deadline.
pub trait ImageSource {
    fn decoded(&self) -> LocalBoxFuture<'static, Result<BitmapSize, LoadError>>;
}

/// Everything the rendering layer needs to paint a completed pass.
#[derive(Debug, Clone)]
pub struct PassSummary<Id> {
    pub generation: PassGeneration,
    /// Height of the grid container, the tallest column.
    pub container_height: f64,
    /// Placements in item order.
    pub placements: Vec<(Id, Placement)>,
}

type MeasureEvent<Id> = (PassGeneration, Id, Result<BitmapSize, LoadError>);

struct PendingResize {
    token: RegistrationToken,
}

struct State<W: LayoutItem + 'static> {
    waterfall: Waterfall<W>,
    loop_handle: LoopHandle<'static, State<W>>,
    scheduler: Scheduler<MeasureEvent<W::Id>>,
    /// Viewport width of the most recent resize signal.
    viewport: f64,
    /// Relayout timer armed by the last resize signal, if any.
    pending_resize: Option<PendingResize>,
    completion_tx: Sender<PassSummary<W::Id>>,
}

impl<W> State<W>
where
    W: LayoutItem + ImageSource + 'static,
    W::Id: 'static,
{
    /// Begins a fresh pass at the current viewport and schedules a load
    /// future for every item that cannot be measured up front.
    fn relayout(&mut self) -> PassGeneration {
        let generation = self.waterfall.begin_pass(self.viewport);

        let pending: Vec<W::Id> = match self.waterfall.pass() {
            Some(pass) => pass.pending().cloned().collect(),
            None => Vec::new(),
        };

        for id in pending {
            let Some(item) = self.waterfall.items().iter().find(|item| *item.id() == id) else {
                continue;
            };

            let future = item.decoded();
            let tagged = {
                let id = id.clone();
                async move { (generation, id, future.await) }
            };
            if let Err(err) = self.scheduler.schedule(tagged) {
                // The executor is gone; settle the item so the pass can
                // still finish.
                warn!("error scheduling an image load: {err}");
                self.waterfall.resolve_image(generation, &id, Err(LoadError::Failed));
            }
        }

        self.notify_complete();
        generation
    }

    /// Feeds one settled load back into the engine.
    fn on_measure(&mut self, event: MeasureEvent<W::Id>) {
        let (generation, id, outcome) = event;
        match self.waterfall.resolve_image(generation, &id, outcome) {
            Resolution::Measured { pass_complete: true } => self.notify_complete(),
            Resolution::Measured { .. } | Resolution::Stale | Resolution::UnknownItem => (),
        }
    }

    /// Schedules a debounced relayout.
    ///
    /// Any relayout armed by an earlier signal is replaced, so the timer
    /// only fires after a quiet period of the configured delay.
    fn notify_resize(&mut self, viewport: f64) {
        self.viewport = viewport;

        let debounce = self.waterfall.options().resize_debounce;
        if debounce.is_zero() {
            self.relayout();
            return;
        }

        let timer = Timer::from_duration(debounce);
        let token = self
            .loop_handle
            .insert_source(timer, move |_, _, state: &mut State<W>| {
                state.pending_resize = None;
                state.relayout();
                TimeoutAction::Drop
            })
            .unwrap();

        if let Some(PendingResize { token: old_token }) =
            self.pending_resize.replace(PendingResize { token })
        {
            self.loop_handle.remove(old_token);
        }
    }

    fn summary(&self) -> Option<PassSummary<W::Id>> {
        let pass = self.waterfall.pass()?;
        pass.is_complete().then(|| PassSummary {
            generation: pass.generation(),
            container_height: pass.container_height(),
            placements: pass
                .placements()
                .map(|(id, placement)| (id.clone(), placement))
                .collect(),
        })
    }

    fn notify_complete(&mut self) {
        let Some(summary) = self.summary() else {
            return;
        };

        trace!(
            "pass {} complete, container height {}",
            summary.generation,
            summary.container_height,
        );
        if let Err(err) = self.completion_tx.try_send(summary) {
            trace!("dropping pass summary: {err}");
        }
    }
}

/// The layout engine wired to its event loop.
///
/// Single-threaded and cooperative: everything, including every image-load
/// future, runs on the calling thread inside [`Runtime::dispatch`] or
/// [`Runtime::complete_current_pass`].
pub struct Runtime<W: LayoutItem + 'static> {
    event_loop: EventLoop<'static, State<W>>,
    state: State<W>,
    completion_rx: Receiver<PassSummary<W::Id>>,
}

impl<W> Runtime<W>
where
    W: LayoutItem + ImageSource + 'static,
    W::Id: 'static,
{
    pub fn new(options: Rc<Options>) -> anyhow::Result<Self> {
        let event_loop = EventLoop::try_new().context("error creating the event loop")?;
        let loop_handle = event_loop.handle();

        let (executor, scheduler) =
            calloop::futures::executor().context("error creating the futures executor")?;
        loop_handle
            .insert_source(executor, |event, _, state: &mut State<W>| {
                state.on_measure(event);
            })
            .unwrap();

        let (completion_tx, completion_rx) = async_channel::unbounded();

        let state = State {
            waterfall: Waterfall::new(options),
            loop_handle,
            scheduler,
            viewport: 0.,
            pending_resize: None,
            completion_tx,
        };

        Ok(Self {
            event_loop,
            state,
            completion_rx,
        })
    }

    pub fn waterfall(&self) -> &Waterfall<W> {
        &self.state.waterfall
    }

    /// Replaces the item sequence without laying it out yet.
    pub fn set_items(&mut self, items: Vec<W>) {
        self.state.waterfall.set_items(items);
    }

    /// Lays the current items out right now.
    ///
    /// This is the entry point for everything that must not wait for a
    /// debounce: initial render, navigation, view-mode toggles and
    /// thumbnail-size changes.
    pub fn relayout_now(&mut self, viewport: f64) -> PassGeneration {
        self.state.viewport = viewport;
        self.state.relayout()
    }

    /// Signals that the viewport resized; the relayout fires debounced.
    pub fn notify_resize(&mut self, viewport: f64) {
        self.state.notify_resize(viewport);
    }

    /// Summaries of completed passes, one per completion, oldest first.
    pub fn completions(&self) -> Receiver<PassSummary<W::Id>> {
        self.completion_rx.clone()
    }

    /// Runs the event loop for one slice of at most `timeout`.
    pub fn dispatch(&mut self, timeout: Duration) -> anyhow::Result<()> {
        self.event_loop
            .dispatch(Some(timeout), &mut self.state)
            .context("error dispatching the event loop")
    }

    /// Dispatches the loop until the current pass has placed every item.
    ///
    /// Bails if `deadline` elapses first, which is how a load that never
    /// settles surfaces to the embedder.
    pub fn complete_current_pass(&mut self, deadline: Duration) -> anyhow::Result<PassSummary<W::Id>> {
        if self.state.waterfall.pass().is_none() {
            bail!("no layout pass in flight");
        }

        let deadline = Instant::now() + deadline;
        loop {
            if let Some(summary) = self.state.summary() {
                return Ok(summary);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                bail!("layout pass did not complete in time");
            }
            self.event_loop
                .dispatch(Some(remaining.min(Duration::from_millis(50))), &mut self.state)
                .context("error dispatching the event loop")?;
        }
    }
}
