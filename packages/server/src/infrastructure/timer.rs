//! Race timers.
//!
//! Each timer is a tokio task that sends [`TimerEvent`]s back into the
//! coordinator's command channel. There is at most one timer per
//! [`TimerKind`]: starting one aborts the previous task of that kind, and
//! every event carries the id of the timer that produced it so an event
//! already queued by a superseded timer is rejected by [`TimerService::accept`].

use std::time::Duration;

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// 3, 2, 1, 0 before the race
    Countdown,
    /// End of the race time limit
    Deadline,
    /// Periodic CPM refresh while racing
    Refresh,
}

/// Callback delivered through the coordinator's command channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CountdownTick { id: u64, value: u32 },
    Deadline { id: u64 },
    Refresh { id: u64 },
}

impl TimerEvent {
    pub fn kind(&self) -> TimerKind {
        match self {
            TimerEvent::CountdownTick { .. } => TimerKind::Countdown,
            TimerEvent::Deadline { .. } => TimerKind::Deadline,
            TimerEvent::Refresh { .. } => TimerKind::Refresh,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            TimerEvent::CountdownTick { id, .. }
            | TimerEvent::Deadline { id }
            | TimerEvent::Refresh { id } => *id,
        }
    }

    /// Whether this is the last event its timer will produce
    fn is_last(&self) -> bool {
        matches!(
            self,
            TimerEvent::CountdownTick { value: 0, .. } | TimerEvent::Deadline { .. }
        )
    }
}

#[derive(Debug)]
struct TimerSlot {
    id: u64,
    handle: JoinHandle<()>,
}

/// Owner of the countdown, deadline and refresh timers.
///
/// Generic over the command type of the channel the events are sent into.
#[derive(Debug)]
pub struct TimerService<C> {
    sender: UnboundedSender<C>,
    next_id: u64,
    countdown: Option<TimerSlot>,
    deadline: Option<TimerSlot>,
    refresh: Option<TimerSlot>,
}

impl<C> TimerService<C>
where
    C: From<TimerEvent> + Send + 'static,
{
    pub fn new(sender: UnboundedSender<C>) -> Self {
        Self {
            sender,
            next_id: 0,
            countdown: None,
            deadline: None,
            refresh: None,
        }
    }

    /// Tick `from`, `from - 1`, ..., `0`, one value per `period`, the first
    /// one `period` after this call.
    pub fn start_countdown(&mut self, from: u32, period: Duration) -> u64 {
        let sender = self.sender.clone();
        self.start(TimerKind::Countdown, move |id| async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            for value in (0..=from).rev() {
                ticker.tick().await;
                if sender
                    .send(C::from(TimerEvent::CountdownTick { id, value }))
                    .is_err()
                {
                    return;
                }
            }
        })
    }

    /// Fire once after `after`.
    pub fn start_deadline(&mut self, after: Duration) -> u64 {
        let sender = self.sender.clone();
        self.start(TimerKind::Deadline, move |id| async move {
            time::sleep(after).await;
            let _ = sender.send(C::from(TimerEvent::Deadline { id }));
        })
    }

    /// Fire every `period` until cancelled, the first time `period` after this call.
    pub fn start_refresh(&mut self, period: Duration) -> u64 {
        let sender = self.sender.clone();
        self.start(TimerKind::Refresh, move |id| async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if sender.send(C::from(TimerEvent::Refresh { id })).is_err() {
                    return;
                }
            }
        })
    }

    /// Check that `event` comes from the live timer of its kind.
    ///
    /// Events from cancelled or replaced timers return false and must be
    /// dropped. The final event of a one-shot timer releases its slot.
    pub fn accept(&mut self, event: &TimerEvent) -> bool {
        let slot = self.slot_mut(event.kind());
        let live = slot.as_ref().is_some_and(|s| s.id == event.id());
        if live && event.is_last() {
            *slot = None;
        }
        live
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Countdown => self.countdown.is_some(),
            TimerKind::Deadline => self.deadline.is_some(),
            TimerKind::Refresh => self.refresh.is_some(),
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(slot) = self.slot_mut(kind).take() {
            slot.handle.abort();
            tracing::debug!("Cancelled {:?} timer #{}", kind, slot.id);
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::Countdown);
        self.cancel(TimerKind::Deadline);
        self.cancel(TimerKind::Refresh);
    }

    fn start<F, Fut>(&mut self, kind: TimerKind, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.cancel(kind);
        self.next_id += 1;
        let id = self.next_id;
        let handle = tokio::spawn(task(id));
        *self.slot_mut(kind) = Some(TimerSlot { id, handle });
        tracing::debug!("Started {:?} timer #{}", kind, id);
        id
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerSlot> {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::Deadline => &mut self.deadline,
            TimerKind::Refresh => &mut self.refresh,
        }
    }
}

impl<C> Drop for TimerService<C> {
    fn drop(&mut self) {
        for slot in [
            self.countdown.take(),
            self.deadline.take(),
            self.refresh.take(),
        ]
        .into_iter()
        .flatten()
        {
            slot.handle.abort();
        }
    }
}
