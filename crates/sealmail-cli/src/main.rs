//! sealmail - encrypting S/MIME mail delivery from the command line.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sealmail_cli::run().await
}
