use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    siteforge::cli::run().await
}
