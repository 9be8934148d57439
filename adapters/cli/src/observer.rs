use agelife_core::{LifeObserver, RuleSet};

/// Observer that mirrors world notifications into the log.
#[derive(Debug, Default)]
pub(crate) struct LogObserver {
    generation: u64,
}

impl LogObserver {
    /// Last generation reported by the world.
    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }
}

impl LifeObserver for LogObserver {
    fn on_generation_changed(&mut self, generation: u64) {
        self.generation = generation;
        log::debug!("generation {generation}");
    }

    fn on_rule_set_changed(&mut self, rules: RuleSet) {
        let label = if rules.is_three_four() {
            "3-4 life"
        } else {
            "standard life"
        };
        log::info!("rule set: {label}");
    }

    fn on_auto_stop_changed(&mut self, enabled: bool) {
        log::info!("auto-stop {}", if enabled { "enabled" } else { "disabled" });
    }
}
