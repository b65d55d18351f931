use std::time::Duration;

/// Per-stage wall time of one pipeline run.
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    stages: Vec<&'static str>,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    pub fn n(&self) -> usize {
        self.stages.len()
    }

    pub fn get(&self, stage: &str) -> Option<Duration> {
        self.stages
            .iter()
            .position(|s| *s == stage)
            .map(|i| self.duration[i])
    }

    pub fn ts(&self) -> &Vec<Duration> {
        &self.duration
    }

    /// Adds `x` to the stage, creating it on first use.
    pub fn add_or_push(&mut self, stage: &'static str, x: Duration) {
        match self.stages.iter().position(|s| *s == stage) {
            Some(i) => self.duration[i] += x,
            None => {
                self.stages.push(stage);
                self.duration.push(x);
            }
        }
    }

    pub fn clear(&mut self) {
        self.stages = Default::default();
        self.duration = Default::default();
    }

    pub fn summary(&self) -> String {
        self.stages
            .iter()
            .zip(&self.duration)
            .map(|(stage, d)| format!("{stage}: {d:?}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
