use modelpub::cli;
use modelpub::PublisherError;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {}", e);

        // Print the error chain
        for cause in e.chain().skip(1) {
            eprintln!("Caused by: {}", cause);
        }

        let code = e
            .downcast_ref::<PublisherError>()
            .map(PublisherError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}
