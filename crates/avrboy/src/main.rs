fn main() {
    env_logger::init();

    let config = match avrboy::RunConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}\n{}", avrboy::USAGE);
            std::process::exit(2);
        }
    };
    log::debug!("{config:?}");

    if let Err(e) = avrboy::run(config) {
        eprintln!("avrboy: {e:#}");
        std::process::exit(1);
    }
}
