use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(err) = televisit::run().await {
        error!("Service exited with error: {}", err);
        std::process::exit(1);
    }
}
