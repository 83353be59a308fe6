use piston_client::{ClientConfig, ExecutionRequest, ExecutionResult, Executor, PistonClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load PISTON_API_URL and RUST_LOG from a .env file if present
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,piston_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let source = r#"
def factorial(n):
    return 1 if n <= 1 else n * factorial(n - 1)

print(f"Factorial of 5 is {factorial(5)}")
"#;

    let client = PistonClient::new(ClientConfig::from_env())?;
    let request = ExecutionRequest::new("python", "3.10.0", source);

    match client.execute(&request).await {
        ExecutionResult::Success { stdout } => println!("Output:\n{}", stdout),
        ExecutionResult::CompileFailure { message } => println!("Compilation failed:\n{}", message),
        ExecutionResult::RuntimeFailure { message } => println!("Runtime error:\n{}", message),
        ExecutionResult::BackendError { message } => println!("Backend error: {}", message),
    }

    Ok(())
}
