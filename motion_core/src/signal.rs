//! Outward signals to the host scanning pipeline and the verdicts returned to
//! the controller's caller.

use crossbeam_channel as xch;

/// Broadcast to the host scanning pipeline. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionSignal {
    /// The user moved: resume scanning.
    MotionDetected,
    /// Verification found the device did not really move: pause again.
    LocationNotChanging,
}

impl MotionSignal {
    pub fn name(self) -> &'static str {
        match self {
            MotionSignal::MotionDetected => "MotionDetected",
            MotionSignal::LocationNotChanging => "LocationNotChanging",
        }
    }
}

/// Why a motion event was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmReason {
    /// A live fix landed at least the minimum distance away.
    Displaced { distance_m: f64 },
    /// No fix arrived within the verification window.
    SessionTimedOut,
    /// The GPS baseline is too old to compare against.
    GpsCold,
    /// No cached baseline fix to compare against.
    NoBaseline,
    /// Live location updates could not be requested.
    SubscriptionFailed,
}

/// Final outcome of one motion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Confirmed(ConfirmReason),
    /// The device stayed within the minimum distance: false positive.
    Rejected { distance_m: f64 },
}

impl Verdict {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Verdict::Confirmed(_))
    }

    /// Distance measured against the baseline, when there was a live fix.
    pub fn distance_m(&self) -> Option<f64> {
        match *self {
            Verdict::Confirmed(ConfirmReason::Displaced { distance_m })
            | Verdict::Rejected { distance_m } => Some(distance_m),
            Verdict::Confirmed(_) => None,
        }
    }
}

/// Event-broadcast transport. Delivery is best-effort.
pub trait Broadcaster {
    fn publish(&self, signal: MotionSignal);
}

impl<F: Fn(MotionSignal)> Broadcaster for F {
    fn publish(&self, signal: MotionSignal) {
        self(signal);
    }
}

/// Drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn publish(&self, _signal: MotionSignal) {}
}

/// Receiving end handed to the host pipeline.
pub type SignalReceiver = xch::Receiver<MotionSignal>;

/// Forwards signals into a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: xch::Sender<MotionSignal>,
}

impl ChannelBroadcaster {
    pub fn new(tx: xch::Sender<MotionSignal>) -> Self {
        Self { tx }
    }

    /// Unbounded channel; the receiver side goes to the host pipeline.
    pub fn unbounded() -> (Self, SignalReceiver) {
        let (tx, rx) = xch::unbounded();
        (Self { tx }, rx)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, signal: MotionSignal) {
        // If send fails, the pipeline is gone; nothing to deliver to
        if self.tx.send(signal).is_err() {
            tracing::debug!(signal = signal.name(), "no receiver for motion signal");
        }
    }
}
