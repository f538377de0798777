#[tokio::main]
async fn main() -> tagbot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("tagbot=info,serenity=warn"),
    )
    .init();
    log::info!("Starting tagbot Discord bot");

    match tagbot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
