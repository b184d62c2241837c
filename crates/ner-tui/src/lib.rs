pub mod app;
pub mod collector;
pub mod cursor;
pub mod error;
pub mod input;
pub mod prompt;
pub mod tracing_setup;
pub mod ui;
pub mod user_config;
pub mod views;

#[cfg(any(test, feature = "test_harness"))]
pub mod test_utils;

use std::rc::Rc;
use std::sync::Arc;

use app::App;
use ner_core::MemoryStore;
use prompt::TerminalPrompt;
use user_config::NerConfig;
use views::ViewContext;

/// Open the configured mailbox, run the interface until the user quits, and
/// restore the terminal whatever happened.
pub fn try_main(config: NerConfig) -> color_eyre::Result<()> {
    let store = match &config.mailbox {
        Some(path) => MemoryStore::from_json_path(path)?,
        None => {
            tracing::warn!("no mailbox configured, starting with an empty store");
            MemoryStore::default()
        }
    };
    let store = Arc::new(store);
    let prompt = Rc::new(TerminalPrompt::new());
    let (commands_tx, commands_rx) = flume::unbounded();
    let config = Arc::new(config);
    let ctx = ViewContext {
        query: store.clone(),
        tags: store,
        prompt: prompt.clone(),
        config: Arc::clone(&config),
        commands: commands_tx,
    };

    let mut terminal = ratatui::init();
    let result = terminal
        .size()
        .map_err(color_eyre::Report::from)
        .and_then(|size| {
            let mut app = App::new(ctx, commands_rx, size.height);
            app.open_search(&config.default_search);
            app.run(&mut terminal, &prompt)
        });
    ratatui::restore();
    result
}
