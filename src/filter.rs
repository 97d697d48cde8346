// Level gate layer
// Filters events on the signed level scale and applies sampling before formatting.

use crate::fields::EventFields;
use crate::level::Level;
use crate::sampling::Sampler;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub(crate) struct LevelGate {
    threshold: Level,
    sampler: Option<Sampler>,
}

impl LevelGate {
    pub fn new(threshold: Level, sampler: Option<Sampler>) -> Self {
        LevelGate { threshold, sampler }
    }

    /// Most severe signed level an event at this `tracing` level can carry.
    fn ceiling(level: &tracing::Level) -> Level {
        if *level == tracing::Level::ERROR {
            Level::new(i8::MAX)
        } else {
            Level::from(*level)
        }
    }
}

impl<S> Layer<S> for LevelGate
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        !metadata.is_event() || Self::ceiling(metadata.level()) >= self.threshold
    }

    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        let fields = EventFields::from_event(event);
        let level = fields.level_for(event.metadata());
        if level < self.threshold {
            return false;
        }

        match &self.sampler {
            Some(sampler) => sampler.check(level, fields.message.as_deref().unwrap_or_default()),
            None => true,
        }
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(LevelFilter::from_level(self.threshold.to_tracing()))
    }
}
