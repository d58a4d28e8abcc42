// Module layout (Clean Architecture style)
// - bootstrap: configuration, wiring and background tasks
// - infrastructure: Postgres/Redis/HTTP adapters
// - presentation: HTTP handlers and routing
// - application: ports, use cases and event handlers
// - domain: core models and state transitions

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
