use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    swaglabs_e2e::cli::app::run().await
}
