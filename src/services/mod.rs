// Awesomebar services
// Services build on the managers: async storage, suggestion ranking, settings.

pub mod settings_engine;
pub mod storage;
pub mod suggestion_provider;
