// Scoring: experience estimation, the fit score, external-score validation and decisions.
// Everything here is synchronous and pure; the clock is injected through ExperienceEstimator.

pub mod decision;
pub mod experience;
pub mod fit;
pub mod validator;
