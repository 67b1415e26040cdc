#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cleanupbot::run().await
}
