pub mod browser_manager;
pub mod fetch;
pub mod serp;
