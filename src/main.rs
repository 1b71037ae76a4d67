use clap::Parser;
use docshift::cli;
use tracing::debug;

fn main() {
    let args = cli::Args::parse();
    let (locale, res) = cli::dispatch(args);
    if let Err(err) = res {
        debug!("{:?}", err);
        eprintln!("{}", locale.error(&format!("{err:#}")));
        std::process::exit(1);
    }
}
