//! Interactive session state
//!
//! Cycles are not cancelled when a new one starts. Each cycle is stamped with a
//! generation instead, and only the outcome of the latest generation is applied.

use tracing::{debug, info, warn};

use crate::error::InsightsError;
use crate::map::{MapSession, MapStyle};
use crate::models::{ChartSlot, ForecastChart, Insights};

/// Monotonic cycle stamp handed out by [`InsightsSession::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Where the current cycle is
#[derive(Debug, Default)]
pub enum CycleState {
    #[default]
    Idle,
    Loading,
    Ready(Box<Insights>),
    Failed(InsightsError),
}

/// Result of handing an outcome to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer cycle started after this one; its outcome was dropped
    Discarded,
}

#[derive(Debug, Default)]
pub struct InsightsSession {
    latest: u64,
    state: CycleState,
    notice: Option<InsightsError>,
    map: MapSession,
    chart: ChartSlot,
}

impl InsightsSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a cycle: clears the previous notice and enters `Loading`
    pub fn begin(&mut self) -> Generation {
        self.latest += 1;
        self.state = CycleState::Loading;
        self.notice = None;
        debug!("Cycle {} started", self.latest);
        Generation(self.latest)
    }

    fn is_latest(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }

    /// Record a recoverable problem for `generation` (e.g. geolocation fallback)
    pub fn notify(&mut self, generation: Generation, notice: InsightsError) -> Completion {
        if !self.is_latest(generation) {
            return Completion::Discarded;
        }
        self.notice = Some(notice);
        Completion::Applied
    }

    /// Apply the outcome of `generation` if it is still the latest cycle
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<Insights, InsightsError>,
    ) -> Completion {
        if !self.is_latest(generation) {
            warn!(
                "Discarding outcome of cycle {}, cycle {} is newer",
                generation.0, self.latest
            );
            return Completion::Discarded;
        }

        self.state = match outcome {
            Ok(insights) => {
                self.map
                    .place_marker(insights.coordinates, insights.location.name.clone());
                self.chart.replace(ForecastChart::from_weather(&insights.weather));
                info!("Cycle {} ready: {}", generation.0, insights.location.name);
                CycleState::Ready(Box::new(insights))
            }
            Err(e) => {
                info!("Cycle {} failed: {}", generation.0, e);
                CycleState::Failed(e)
            }
        };
        Completion::Applied
    }

    #[must_use]
    pub fn state(&self) -> &CycleState {
        &self.state
    }

    #[must_use]
    pub fn insights(&self) -> Option<&Insights> {
        match &self.state {
            CycleState::Ready(insights) => Some(insights.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&InsightsError> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn map(&self) -> &MapSession {
        &self.map
    }

    pub fn set_map_style(&mut self, style: MapStyle) {
        self.map.set_style(style);
    }

    #[must_use]
    pub fn chart(&self) -> Option<&ForecastChart> {
        self.chart.current()
    }
}
