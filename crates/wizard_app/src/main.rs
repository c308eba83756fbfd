mod app;
mod console;
mod effects;
mod logging;

fn main() -> anyhow::Result<()> {
    let config = app::AppConfig::default();
    logging::initialize(config.log_destination);
    app::run_app(config)
}
