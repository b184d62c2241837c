use ner_tui::{tracing_setup, user_config::NerConfig};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let _guard = tracing_setup::init_tracing()?;

    let config = NerConfig::load();
    tracing::info!(search = %config.default_search, sort = ?config.sort, "starting ner");
    ner_tui::try_main(config)
}
