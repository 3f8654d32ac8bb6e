//! Command-line renderer for volsurf-viz
//!
//! 1. Fetch the surface grid from the pricing service (or use the demo grid)
//! 2. Build the colored triangle mesh
//! 3. Render it to PNG and optionally dump the mesh buffers as JSON

use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{error, info, warn};
use volsurf_viz::api::SurfaceClient;
use volsurf_viz::config::Config;
use volsurf_viz::error::Result;
use volsurf_viz::models::{Grid, VertexLayout};
use volsurf_viz::utils::{render_mesh, ColorScale, MeshBuilder, RenderOptions};

#[derive(Debug, Parser)]
#[command(name = "volsurf-viz", version, about = "Render an implied volatility surface mesh")]
struct Args {
    /// Use the synthetic demo surface instead of calling the pricing service
    #[arg(long)]
    demo: bool,

    /// Side length of the demo grid
    #[arg(long, default_value_t = 10)]
    size: usize,

    /// Substitute the demo surface when the fetch fails
    #[arg(long)]
    fallback_demo: bool,

    #[arg(long, value_enum, default_value_t = VertexLayout::Lattice)]
    layout: VertexLayout,

    #[arg(long, value_enum, default_value_t = ColorScale::RedGreen)]
    color: ColorScale,

    /// PNG output path
    #[arg(short, long, default_value = "output/volatility_surface.png")]
    output: PathBuf,

    /// Also write the mesh buffers as JSON
    #[arg(long)]
    mesh_json: Option<PathBuf>,

    #[arg(long, default_value_t = 0.7)]
    yaw: f64,

    #[arg(long, default_value_t = 0.45)]
    pitch: f64,
}

async fn load_grid(args: &Args, config: &Config) -> Result<Grid> {
    if args.demo {
        info!("Using {}x{} demo surface", args.size, args.size);
        return Ok(Grid::demo(args.size));
    }

    let client = SurfaceClient::new(config.api.clone());
    match client.fetch_grid().await {
        Ok(grid) => Ok(grid),
        Err(e) if args.fallback_demo => {
            warn!("Fetch failed ({}), using demo surface", e);
            Ok(Grid::demo(args.size))
        }
        Err(e) => Err(e),
    }
}

async fn run(args: Args, config: Config) -> Result<()> {
    let grid = load_grid(&args, &config).await?;
    info!("Grid dimensions: {} rows x {} cols", grid.rows(), grid.cols());

    let color_scale = args.color;
    let layout = args.layout;

    let mesh = MeshBuilder::new()
        .layout(layout)
        .color_scale(color_scale)
        .build(&grid);

    info!(
        "Mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    match mesh.bounds {
        Some(b) => info!("Volatility range: {:.4} .. {:.4}", b.min, b.max),
        None => warn!("Grid has no finite volatility values"),
    }
    if mesh.is_empty() {
        warn!("Grid too small to triangulate, rendering axes only");
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let opts = RenderOptions {
        title: if args.demo {
            "Demo Volatility Surface".to_string()
        } else {
            format!("{} Volatility Surface", config.api.symbol)
        },
        yaw: args.yaw,
        pitch: args.pitch,
        color_scale,
        ..RenderOptions::default()
    };
    render_mesh(&mesh, &args.output, &opts)?;
    info!("Volatility surface saved to {:?}", args.output);

    if let Some(path) = &args.mesh_json {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &mesh)?;
        info!("Mesh buffers saved to {:?}", path);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;
    config.init_logging()?;

    if let Err(e) = run(args, config).await {
        error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
