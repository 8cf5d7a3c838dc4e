use clap::Parser;
use doc_vault::config::AppConfig;
use doc_vault::utils::auth::create_jwt;
use dotenvy::dotenv;

/// Prints a 24h bearer token for a user id, signed with JWT_SECRET.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// User id placed in the `sub` claim
    user_id: String,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::from_env();
    let token = create_jwt(&args.user_id, &config.jwt_secret)?;
    println!("{}", token);
    Ok(())
}
