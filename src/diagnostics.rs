use std::fmt;

/// Pipeline stage a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Title,
    Description,
    Code,
    Images,
    Page,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Title => "title",
            Stage::Description => "description",
            Stage::Code => "code",
            Stage::Images => "images",
            Stage::Page => "page",
        };
        f.write_str(name)
    }
}

/// Sink for intermediate extraction details (which strategy matched, lengths).
/// Only observability; extraction never branches on it.
pub trait Diagnostics {
    fn record(&self, stage: Stage, message: &str);
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Diagnostics for Silent {
    fn record(&self, _stage: Stage, _message: &str) {}
}

/// Forwards to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct Traced;

impl Diagnostics for Traced {
    fn record(&self, stage: Stage, message: &str) {
        tracing::debug!(stage = %stage, "{}", message);
    }
}
