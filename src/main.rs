#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aqi_status_lib::run().await
}
