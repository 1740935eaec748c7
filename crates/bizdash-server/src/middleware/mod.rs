// HTTP middleware implementations

pub mod auth; // Session resolution and login gate
