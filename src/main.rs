#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if let Err(e) = ai_triage_lib::run().await {
        eprintln!("ai-triage: {e}");
        std::process::exit(1);
    }
}
