use course_lens::cli;

fn main() {
    env_logger::init();

    if let Err(e) = cli::run() {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
