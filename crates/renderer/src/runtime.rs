use std::time::{Duration, Instant};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames animate continuously or a single
/// frame is evaluated at a fixed timestamp (the deterministic baseline used
/// for regression comparisons).
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap.
        target_fps: Option<f32>,
    },
    /// Render a single still frame at an optional timestamp.
    Still {
        /// Specific timestamp to evaluate the kernel at (seconds).
        time: Option<f32>,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// Snapshot of the time state supplied to the kernel uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed time since the loop began, in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
///
/// Elapsed seconds are measured from construction (the start of the render
/// loop), never from the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {}

    fn sample(&mut self) -> TimeSample {
        TimeSample::new(self.time, 0)
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } => Box::new(FixedTimeSource::new(time.unwrap_or(0.0))),
    }
}

/// Decides when the event loop should issue the next redraw.
///
/// Uncapped animation redraws immediately, capped animation waits out the
/// per-frame deadline, and still mode renders exactly one frame until a
/// refresh is requested (e.g. after a parameter update).
pub(crate) struct FrameScheduler {
    policy: RenderPolicy,
    next_frame_at: Option<Instant>,
    rendered_still: bool,
}

impl FrameScheduler {
    pub fn new(policy: RenderPolicy) -> Self {
        Self {
            policy,
            next_frame_at: None,
            rendered_still: false,
        }
    }

    pub fn ready_for_frame(&mut self, now: Instant) -> bool {
        match &self.policy {
            RenderPolicy::Animate { target_fps: None } => true,
            RenderPolicy::Animate { target_fps: Some(_) } => self
                .next_frame_at
                .map_or(true, |deadline| now >= deadline),
            RenderPolicy::Still { .. } => !self.rendered_still,
        }
    }

    pub fn mark_rendered(&mut self) {
        match &self.policy {
            RenderPolicy::Animate {
                target_fps: Some(fps),
            } if *fps > 0.0 => {
                let interval = Duration::from_secs_f32(1.0 / fps);
                self.next_frame_at = Some(Instant::now() + interval);
            }
            RenderPolicy::Animate { .. } => {}
            RenderPolicy::Still { .. } => self.rendered_still = true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.policy {
            RenderPolicy::Animate {
                target_fps: Some(_),
            } => self.next_frame_at,
            _ => None,
        }
    }

    /// Re-arms still mode so the next tick renders one more frame.
    pub fn request_refresh(&mut self) {
        self.rendered_still = false;
    }
}
