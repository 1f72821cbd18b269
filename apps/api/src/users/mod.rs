// User bootstrap: a bare row keyed by device identifier, created on first launch.

pub mod handlers;
