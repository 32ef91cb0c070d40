//! Fixed-timestep accumulator
//!
//! Decouples the simulation rate from the presentation rate. Wall-clock frame
//! time is clamped, accumulated and consumed in whole `dt` steps; whatever is
//! left over becomes the render interpolation factor.

use crate::consts::{MAX_FRAME_TIME, SIM_DT};

/// Hard cap on steps per frame, on top of the frame-time clamp
const MAX_SUBSTEPS: u32 = 32;

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    pub dt: f32,
    pub max_frame_time: f32,
    accumulator: f32,
    paused: bool,
    last_time: Option<f64>,
    // FPS tracking
    frame_count: u32,
    fps_elapsed: f32,
    fps: u32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_FRAME_TIME)
    }
}

impl FixedTimestep {
    pub fn new(dt: f32, max_frame_time: f32) -> Self {
        Self {
            dt,
            max_frame_time,
            accumulator: 0.0,
            paused: false,
            last_time: None,
            frame_count: 0,
            fps_elapsed: 0.0,
            fps: 0,
        }
    }

    /// Run one presentation frame of `frame_seconds` wall time.
    ///
    /// Calls `update(dt)` once per whole step, then `render(alpha)` exactly
    /// once. Returns the number of steps taken.
    pub fn advance(
        &mut self,
        frame_seconds: f32,
        mut update: impl FnMut(f32),
        render: impl FnOnce(f32),
    ) -> u32 {
        let frame = if frame_seconds.is_finite() {
            frame_seconds.clamp(0.0, self.max_frame_time)
        } else {
            0.0
        };
        self.count_frame(frame);

        let mut steps = 0;
        if !self.paused {
            self.accumulator += frame;
            while self.accumulator >= self.dt && steps < MAX_SUBSTEPS {
                update(self.dt);
                self.accumulator -= self.dt;
                steps += 1;
            }
            if steps == MAX_SUBSTEPS {
                log::warn!("Simulation fell behind, dropping {:.3}s", self.accumulator);
                self.accumulator %= self.dt;
            }
        }

        render(self.alpha());
        steps
    }

    /// Like `advance`, but derives frame time from a wall-clock timestamp in
    /// seconds. The first call only records the timestamp.
    pub fn advance_at(
        &mut self,
        now: f64,
        update: impl FnMut(f32),
        render: impl FnOnce(f32),
    ) -> u32 {
        let elapsed = match self.last_time.replace(now) {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.advance(elapsed, update, render)
    }

    fn count_frame(&mut self, frame: f32) {
        self.frame_count += 1;
        self.fps_elapsed += frame;
        if self.fps_elapsed >= 1.0 {
            self.fps = self.frame_count;
            self.frame_count = 0;
            self.fps_elapsed -= 1.0;
        }
    }

    /// Interpolation factor between the last two simulated states
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// Frames counted over the last full second
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resuming drops any stale timestamp so the pause itself is not replayed
    pub fn resume(&mut self) {
        self.paused = false;
        self.last_time = None;
    }

    pub fn toggle(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}
