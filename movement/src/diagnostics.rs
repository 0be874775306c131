//! Injected diagnostics sink.
//!
//! The controller never calls a global logger or debug renderer directly. The host hands
//! it a [`Diagnostics`] implementation at composition time:
//! - [`LogDiagnostics`]: production default, forwards messages to the `log` facade and
//!   drops draw calls.
//! - [`NoopDiagnostics`]: discards everything.
//! - [`RecordingDiagnostics`]: keeps everything, for tests and debug overlays.

use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

pub trait Diagnostics {
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color, duration: f32);

    fn draw_arrow(&mut self, start: Vec3, end: Vec3, color: Color, duration: f32);

    fn draw_circle(&mut self, center: Vec3, normal: Vec3, radius: f32, color: Color, duration: f32);

    fn log(&mut self, level: Level, message: &str);

    fn info(&mut self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&mut self, message: &str) {
        self.log(Level::Warn, message);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn draw_line(&mut self, _: Vec3, _: Vec3, _: Color, _: f32) {}

    fn draw_arrow(&mut self, _: Vec3, _: Vec3, _: Color, _: f32) {}

    fn draw_circle(&mut self, _: Vec3, _: Vec3, _: f32, _: Color, _: f32) {}

    fn log(&mut self, _: Level, _: &str) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn draw_line(&mut self, _: Vec3, _: Vec3, _: Color, _: f32) {}

    fn draw_arrow(&mut self, _: Vec3, _: Vec3, _: Color, _: f32) {}

    fn draw_circle(&mut self, _: Vec3, _: Vec3, _: f32, _: Color, _: f32) {}

    fn log(&mut self, level: Level, message: &str) {
        match level {
            Level::Debug => log::debug!(target: "movement", "{message}"),
            Level::Info => log::info!(target: "movement", "{message}"),
            Level::Warn => log::warn!(target: "movement", "{message}"),
            Level::Error => log::error!(target: "movement", "{message}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Line { start: Vec3, end: Vec3 },
    Arrow { start: Vec3, end: Vec3 },
    Circle { center: Vec3, normal: Vec3, radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawn {
    pub shape: Shape,
    pub color: Color,
    pub duration: f32,
}

#[derive(Clone, Debug, Default)]
pub struct RecordingDiagnostics {
    pub drawn: Vec<Drawn>,
    pub messages: Vec<(Level, String)>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, level: Level) -> usize {
        self.messages.iter().filter(|(l, _)| *l == level).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|(l, _)| *l == Level::Warn)
            .map(|(_, m)| m.as_str())
    }

    pub fn clear(&mut self) {
        self.drawn.clear();
        self.messages.clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color, duration: f32) {
        self.drawn.push(Drawn {
            shape: Shape::Line { start, end },
            color,
            duration,
        });
    }

    fn draw_arrow(&mut self, start: Vec3, end: Vec3, color: Color, duration: f32) {
        self.drawn.push(Drawn {
            shape: Shape::Arrow { start, end },
            color,
            duration,
        });
    }

    fn draw_circle(&mut self, center: Vec3, normal: Vec3, radius: f32, color: Color, duration: f32) {
        self.drawn.push(Drawn {
            shape: Shape::Circle {
                center,
                normal,
                radius,
            },
            color,
            duration,
        });
    }

    fn log(&mut self, level: Level, message: &str) {
        self.messages.push((level, message.to_owned()));
    }
}
