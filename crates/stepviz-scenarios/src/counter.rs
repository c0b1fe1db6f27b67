//! Contador de 3 pasos: `{count: 0}` y tres incrementos.

use serde::Serialize;
use stepviz_core::{step, FnStep, Scenario, StepOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterBag {
    pub count: u32,
}

fn increment(id: &str) -> FnStep<CounterBag> {
    step(id, |bag: &CounterBag| {
        let next = CounterBag { count: bag.count + 1 };
        let text = format!("The counter moves from {} to {}.", bag.count, next.count);
        StepOutcome::new(next, "Increment", text)
    })
}

pub fn three_step_counter() -> Scenario<CounterBag> {
    Scenario::builder("counter", CounterBag { count: 0 }).title("3-step counter")
                                                         .intro("Ready", "Each step adds one to the counter.")
                                                         .step(increment("increment_1"))
                                                         .step(increment("increment_2"))
                                                         .step(increment("increment_3"))
                                                         .build()
}
