use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};
use plate_check::config::{DEFAULT_DETECT_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_VERIFY_URL};
use plate_check::results::ResultsCard;
use plate_check::{CapturePipeline, CaptureSurface, FileCamera, ScreenEvent, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[macro_use]
extern crate failure;

const EXIT_NO_PERMIT: i32 = 1;
const EXIT_FAILED: i32 = 2;
const EXIT_NO_PLATE: i32 = 3;

/// Read the license plate in a photo and check whether it has a valid parking permit.
#[derive(Parser, Debug)]
#[command(name = "plate-check", version)]
struct Args {
    /// Photo of the vehicle's license plate
    image: PathBuf,

    #[arg(long, env = "DETECT_URL", default_value = DEFAULT_DETECT_URL)]
    detect_url: String,

    #[arg(long, env = "VERIFY_URL", default_value = DEFAULT_VERIFY_URL)]
    verify_url: String,

    /// Per-request timeout for both remote services
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Print the outcome as JSON instead of a results card
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting plate-check");

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            EXIT_FAILED
        }
    };
    info!("Exiting main");
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32, failure::Error> {
    let config = ServiceConfig::new(
        &args.detect_url,
        &args.verify_url,
        Duration::from_secs(args.timeout_secs),
    )?;
    let camera = Arc::new(FileCamera::new(args.image).with_device("file"));
    let pipeline = CapturePipeline::from_config(camera, &config)?;
    let (surface, mut view) = CaptureSurface::mount(Arc::new(pipeline));

    let mut state = view.state.clone();
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            debug!("Stage: {:?}", state.borrow().stage);
        }
    });

    let task = surface
        .capture()
        .ok_or_else(|| format_err!("Capture request was rejected"))?;
    let code = match view.events.recv().await {
        Some(ScreenEvent::ShowResults(outcome)) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", ResultsCard(&outcome));
            }
            if outcome.permit_valid() {
                0
            } else {
                EXIT_NO_PERMIT
            }
        }
        Some(ScreenEvent::NoPlateFound(alert)) => {
            eprintln!("{}", alert);
            EXIT_NO_PLATE
        }
        Some(ScreenEvent::Failed(alert)) => {
            eprintln!("{}", alert);
            EXIT_FAILED
        }
        None => return Err(format_err!("Capture surface closed without a result")),
    };
    task.await
        .map_err(|e| format_err!("Capture task failed: {}", e))?;
    Ok(code)
}
