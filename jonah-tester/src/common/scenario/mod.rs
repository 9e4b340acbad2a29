use anyhow::Result;

pub mod catalog;
pub mod full_journey;
pub mod smoke;

/// Per-iteration inputs handed to a scenario body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioCtx {
    pub iteration: usize,
    pub verbose: bool,
}

pub type ScenarioBody = fn(&ScenarioCtx) -> Result<()>;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    body: ScenarioBody,
}

impl TestScenario {
    #[must_use]
    pub const fn new(key: &'static str, name: &'static str, body: ScenarioBody) -> Self {
        Self { key, name, body }
    }

    /// # Errors
    /// Returns the first expectation the iteration violated.
    pub fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        (self.body)(ctx)
    }
}

/// Scenario keys run by `--scenarios all`, in execution order.
pub const ALL_SCENARIOS: [&str; 8] = [
    "smoke",
    "full-journey",
    "wrong-answers",
    "resume",
    "restart",
    "storage-failure",
    "out-of-order",
    "navigation",
];

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke::smoke_scenario()),
        "full-journey" | "full" => Some(full_journey::full_journey_scenario()),
        "wrong-answers" | "wrong" => Some(catalog::wrong_answers_scenario()),
        "resume" => Some(catalog::resume_scenario()),
        "restart" => Some(catalog::restart_scenario()),
        "storage-failure" | "storage" => Some(catalog::storage_failure_scenario()),
        "out-of-order" | "locked" => Some(catalog::out_of_order_scenario()),
        "navigation" | "nav" => Some(catalog::navigation_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    ALL_SCENARIOS
        .iter()
        .filter_map(|key| get_scenario(key).map(|scenario| (scenario.key, scenario.name)))
        .collect()
}
