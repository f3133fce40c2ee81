use clap::Parser;
use tracing_subscriber::EnvFilter;

use microframe::app::App;
use microframe::middleware::TracingMiddleware;
use microframe::routes::{self, JwtConfig};

/// Demo server wiring the hello-world and JWT routes.
#[derive(Parser, Debug)]
#[command(name = "microframe", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "MICROFRAME_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "MICROFRAME_PORT", default_value_t = 8080)]
    port: u16,

    /// JWT signing secret for the demo login routes
    #[arg(long, env = "MICROFRAME_JWT_SECRET", default_value = "test")]
    jwt_secret: String,

    /// Print the registered routes at startup
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut app = App::new();
    app.middleware(TracingMiddleware);
    routes::hello_world::register(&mut app)?;
    routes::auth::register(&mut app, JwtConfig::new(cli.jwt_secret))?;
    app.on_startup(|| tracing::info!("Startup hooks complete"));
    app.on_shutdown(|| tracing::info!("Shutdown hooks complete"));
    if cli.verbose {
        app.dump_routes();
    }

    app.run(&cli.host, cli.port)
}
