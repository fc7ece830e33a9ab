use clap::{Parser, Subcommand};
use icon_forge::encoder;
use icon_forge::generation::DOWNLOAD_FILE_NAME;
use icon_forge::state::{Orchestrator, DEFAULT_PROMPT};
use icon_forge::ui::upload;
use icon_forge::{Config, GeminiClient, ImageFile};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "iconctl", about = "Generate icons from an image and a purpose", version)]
struct Cli {
    /// Override GEMINI_URL
    #[arg(global = true, long)]
    gemini_url: Option<String>,

    /// Override GEMINI_MODEL
    #[arg(global = true, long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an icon from a source image
    Generate {
        /// PNG, JPEG or WEBP source image
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        /// What the icon is for
        #[arg(long, value_name = "TEXT", default_value = DEFAULT_PROMPT)]
        prompt: String,
        /// Output path (defaults to ./generated-icon.png)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Print the data URL the image would be sent as
    Encode {
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        /// Print only the base64 payload, without the data-URL prefix
        #[arg(long)]
        payload_only: bool,
    },
}

/// Validate a path the way the upload surface validates a browser file.
fn image_file(path: &Path) -> Result<ImageFile, Box<dyn std::error::Error>> {
    let mime = upload::mime_from_path(path).unwrap_or("application/octet-stream");
    let file = ImageFile::from_path(path, mime);
    upload::validate(&file)?;
    Ok(file)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut conf = Config::new()?;
    if let Some(url) = cli.gemini_url {
        conf.gemini_url = url;
    }
    if let Some(model) = cli.model {
        conf.gemini_model = model;
    }

    match cli.command {
        Commands::Generate { image, prompt, out } => {
            let file = image_file(&image)?;
            let client = GeminiClient::from_config(&conf)?;

            let mut orchestrator = Orchestrator::new();
            orchestrator.set_prompt(prompt);
            orchestrator.on_image_upload(file)?;
            orchestrator.generate_with(&client).await;

            if let Some(message) = orchestrator.error() {
                eprintln!("Error: {}", message);
                std::process::exit(1);
            }
            let Some(icon) = orchestrator.result() else {
                eprintln!("Error: no icon was generated");
                std::process::exit(1);
            };
            let bytes = icon.png_bytes()?;
            let path = out.unwrap_or_else(|| PathBuf::from(DOWNLOAD_FILE_NAME));
            tokio::fs::write(&path, &bytes).await?;
            println!("Saved {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
        Commands::Encode { image, payload_only } => {
            let file = image_file(&image)?;
            let encoded = encoder::encode(&file).await?;
            if payload_only {
                println!("{}", encoded.base64_data);
            } else {
                println!("{}", encoded.to_data_url());
            }
            Ok(())
        }
    }
}
