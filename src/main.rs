use flowfield::app::App;
use flowfield::config::Config;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("config load failed, using defaults: {}", e);
            Config::default()
        }
    };

    if let Err(e) = App::new(config).run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
