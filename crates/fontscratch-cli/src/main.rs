use fontscratch::build_minimal_font;
use fontscratch_cli::{app, log_filter, metrics_from_args, save_font};
use std::process;

fn main() {
    let matches = app().get_matches();

    env_logger::init_from_env(env_logger::Env::default().filter_or(
        env_logger::DEFAULT_FILTER_ENV,
        log_filter(matches.occurrences_of("verbose")),
    ));

    let metrics = match metrics_from_args(&matches) {
        Ok(metrics) => metrics,
        Err(e) => {
            log::error!("{}", e);
            process::exit(2);
        }
    };

    let bytes = match build_minimal_font(&metrics) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Could not build font: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = save_font(&bytes, &matches) {
        log::error!("Could not write font: {}", e);
        process::exit(1);
    }
}
