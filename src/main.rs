use anyhow::Result;
use switchyard::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::from_args().await?;
    let args = switchyard::cli::Args::parse_args();

    app.run(args).await?;

    Ok(())
}
