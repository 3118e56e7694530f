use artexpo::bootstrapper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local overrides; the process environment still wins
    dotenvy::dotenv().ok();

    bootstrapper::run().await
}
