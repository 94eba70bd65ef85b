use clap::Parser;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "cep-cli")]
#[command(about = "Ask the CEP gateway for the current temperature", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Postal code, 8 digits
    cep: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let res = reqwest::Client::new()
        .post(&cli.url)
        .json(&serde_json::json!({ "cep": cli.cep }))
        .send()
        .await?;

    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("Response: {}", text);
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
