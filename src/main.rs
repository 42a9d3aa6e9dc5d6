//! dashwatch - turns a Dash-style button's ARP broadcast into a Slack post

#[tokio::main]
async fn main() {
    if let Err(e) = dashwatch::logging::init_logging() {
        dashwatch::logging::init_console_logging();
        dashwatch::log_warn!("File logging unavailable, console only: {}", e);
    }

    if let Err(e) = dashwatch::app::run(std::env::args()).await {
        dashwatch::log_error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
