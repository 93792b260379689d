// PageShade state managers
// Managers hold host-side state the extension queries: the open tabs.

pub mod tab_manager;
