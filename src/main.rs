use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use academic_server::config::AppConfig;
use academic_server::startup;

#[derive(Parser, Debug)]
#[command(name = "academic-server")]
#[command(about = "A REST API for academic records (subjects, teachers, courses)")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing for better debugging
    tracing_subscriber::fmt::init();

    // Load configuration from specified file or use defaults
    let (mut app_config, using_defaults) =
        if args.config == "config.yaml" && !std::path::Path::new("config.yaml").exists() {
            println!("⚠️  No config.yaml found, using default configuration:");
            println!("   - In-memory SQLite database");
            println!("   - API served at /api/v1");
            println!("   🚀 Perfect for development and testing!\n");
            (AppConfig::default_config(), true)
        } else {
            let config = AppConfig::load_from_file(&args.config)
                .map_err(|e| format!("Failed to load configuration: {}", e))?;
            (config, false)
        };

    // Override with command line arguments if provided
    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }

    if !using_defaults {
        println!("🔧 Configuration loaded:");
        println!(
            "   Server: {}:{}",
            app_config.server.host, app_config.server.port
        );
        if let Some(database) = &app_config.backend.database {
            println!(
                "   Backend: database/{} ({})",
                database.db_type, database.url
            );
        } else {
            println!("   Backend: {}", app_config.backend.backend_type);
        }
        println!("   Base path: {}", app_config.api.base_path);
    }

    // Setup backend (connect, create schema, health check)
    let backend = startup::setup_backend(&app_config).await?;

    let app_config_arc = Arc::new(app_config.clone());
    let app = startup::build_router(backend, app_config_arc);

    // Start the server
    let host: std::net::IpAddr = app_config.server.host.parse().unwrap_or_else(|_| {
        eprintln!(
            "Invalid host address: {}, using 127.0.0.1",
            app_config.server.host
        );
        [127, 0, 0, 1].into()
    });
    let addr = SocketAddr::from((host, app_config.server.port));
    let base = app_config.api.base_path.trim_end_matches('/');
    println!("🚀 Academic records server listening on {}", addr);
    println!("   📚 Subjects: {}/subjects", base);
    println!("   🧑‍🏫 Teachers: {}/teachers", base);
    println!("   🗓  Courses:  {}/courses", base);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
