//! AI system governance intake: a ten-section disclosure wizard with derived risk tier and
//! completion tracking, a flat use-case registry, and the HTTP routers that expose both.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
