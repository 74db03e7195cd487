#[tokio::main]
async fn main() {
    buildboard::start_server().await;
}
