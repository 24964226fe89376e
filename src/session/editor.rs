//! Start/end times being edited before a clip is saved.

use crate::time_format::format_video_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Back,
    Forward,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipEditor {
    start_time: f64,
    end_time: f64,
    step: f64,
}

impl ClipEditor {
    pub fn new(step: f64) -> Self {
        Self {
            start_time: 0.0,
            end_time: 0.0,
            step,
        }
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn set_start(&mut self, seconds: f64) {
        self.start_time = seconds;
    }

    pub fn set_end(&mut self, seconds: f64) {
        self.end_time = seconds;
    }

    /// Moving back stops at zero; moving forward is unbounded.
    pub fn nudge_start(&mut self, nudge: Nudge) {
        self.start_time = nudged(self.start_time, self.step, nudge);
    }

    pub fn nudge_end(&mut self, nudge: Nudge) {
        self.end_time = nudged(self.end_time, self.step, nudge);
    }

    /// `(start, end)` as shown on the editor buttons.
    pub fn display(&self) -> (String, String) {
        (
            format_video_time(self.start_time),
            format_video_time(self.end_time),
        )
    }
}

fn nudged(value: f64, step: f64, nudge: Nudge) -> f64 {
    match nudge {
        Nudge::Back => (value - step).max(0.0),
        Nudge::Forward => value + step,
    }
}
