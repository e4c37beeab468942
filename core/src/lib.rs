//! Feasibility engine for affordable-housing scenarios.
//!
//! A scenario flows one way through the engine:
//!   1. `results_calculator`  scenario + project + assumptions → ScenarioResults
//!   2. `demand_forecast`     population growth → housing demand
//!   3. `investment`          results + financing → returns
//!   4. `timeline`            results + duration → construction phases
//!   5. `compliance`          scenario + results + rules → compliance report
//!
//! Components 2–5 never call each other. All five are pure functions;
//! only `engine` and `store` touch persistence.

pub mod comparison;
pub mod compliance;
pub mod config;
pub mod demand_forecast;
pub mod engine;
pub mod error;
pub mod investment;
pub mod project;
pub mod request;
pub mod results_calculator;
pub mod scenario;
pub mod store;
pub mod timeline;
pub mod types;
