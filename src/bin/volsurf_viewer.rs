use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use volsurf_viz::api::SurfaceClient;
use volsurf_viz::config::Config;
use volsurf_viz::error::{Result, VizError};
use volsurf_viz::models::{Grid, Mesh, VertexLayout};
use volsurf_viz::utils::{render_mesh_in_memory, ColorScale, MeshBuilder, MeshCache, RenderOptions};

const DEMO_SIZE: usize = 10;

struct SurfaceViewerApp {
    fetch_sender: mpsc::Sender<()>,
    grid_receiver: mpsc::Receiver<Result<Grid>>,
    status: String,
    error: Option<String>,
    loading: bool,
    grid: Option<Grid>,
    cache: MeshCache,
    mesh: Option<Arc<Mesh>>,
    texture: Option<egui::TextureHandle>,
    layout: VertexLayout,
    color_scale: ColorScale,
    yaw: f64,
    pitch: f64,
    needs_render: bool,
}

impl SurfaceViewerApp {
    fn set_grid(&mut self, grid: Grid, source: &str) {
        self.status = format!(
            "Showing {} surface ({} x {})",
            source,
            grid.rows(),
            grid.cols()
        );
        self.error = None;
        self.grid = Some(grid);
        self.needs_render = true;
    }

    fn render(&mut self, ctx: &egui::Context) {
        self.needs_render = false;
        let Some(grid) = &self.grid else {
            return;
        };

        let mesh = self.cache.get_or_build(grid);
        let opts = RenderOptions {
            yaw: self.yaw,
            pitch: self.pitch,
            color_scale: self.color_scale,
            ..RenderOptions::default()
        };

        match render_mesh_in_memory(&mesh, &opts) {
            Ok(img) => {
                let size = [img.width() as usize, img.height() as usize];
                let color_image = egui::ColorImage::from_rgb(size, img.as_raw());
                self.texture = Some(ctx.load_texture(
                    "volatility-surface",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => {
                warn!("Failed to render surface: {}", e);
                self.error = Some(e.user_message().to_string());
            }
        }
        self.mesh = Some(mesh);
    }
}

impl eframe::App for SurfaceViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Whichever fetch lands last wins
        let mut latest = None;
        while let Ok(outcome) = self.grid_receiver.try_recv() {
            latest = Some(outcome);
        }
        match latest {
            Some(Ok(grid)) => {
                self.loading = false;
                self.set_grid(grid, "fetched");
            }
            Some(Err(e)) => {
                self.loading = false;
                self.status.clear();
                self.error = Some(e.user_message().to_string());
            }
            None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Volatility Surface Visualizer");

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!self.loading, egui::Button::new("Fetch Surface"))
                    .clicked()
                {
                    match self.fetch_sender.try_send(()) {
                        Ok(()) => {
                            self.loading = true;
                            self.error = None;
                            self.status = "Loading...".to_string();
                        }
                        Err(e) => self.error = Some(format!("Error: {}", e)),
                    }
                }
                if ui.button("Load Demo").clicked() {
                    self.set_grid(Grid::demo(DEMO_SIZE), "demo");
                }
            });

            ui.horizontal(|ui| {
                let before = (self.layout, self.color_scale);

                egui::ComboBox::from_label("Vertices")
                    .selected_text(match self.layout {
                        VertexLayout::Lattice => "Lattice",
                        VertexLayout::Cell => "Per cell",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.layout, VertexLayout::Lattice, "Lattice");
                        ui.selectable_value(&mut self.layout, VertexLayout::Cell, "Per cell");
                    });

                egui::ComboBox::from_label("Colors")
                    .selected_text(match self.color_scale {
                        ColorScale::RedGreen => "Red-green",
                        ColorScale::Viridis => "Viridis",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.color_scale, ColorScale::RedGreen, "Red-green");
                        ui.selectable_value(&mut self.color_scale, ColorScale::Viridis, "Viridis");
                    });

                if before != (self.layout, self.color_scale) {
                    self.cache.set_builder(
                        MeshBuilder::new()
                            .layout(self.layout)
                            .color_scale(self.color_scale),
                    );
                    self.needs_render = true;
                }
            });

            ui.horizontal(|ui| {
                let yaw = ui.add(egui::Slider::new(&mut self.yaw, -PI..=PI).text("Yaw"));
                let pitch = ui.add(egui::Slider::new(&mut self.pitch, 0.0..=1.5).text("Pitch"));
                // Re-render once a drag ends, not on every intermediate value
                let dragging = yaw.dragged() || pitch.dragged();
                if yaw.drag_stopped()
                    || pitch.drag_stopped()
                    || (!dragging && (yaw.changed() || pitch.changed()))
                {
                    self.needs_render = true;
                }
            });

            ui.separator();
            if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::RED, err);
            } else {
                ui.label(&self.status);
            }
            if let Some(mesh) = &self.mesh {
                let range = mesh
                    .bounds
                    .map(|b| format!("{:.3} .. {:.3}", b.min, b.max))
                    .unwrap_or_else(|| "n/a".to_string());
                ui.label(format!(
                    "{} vertices, {} triangles, volatility {}",
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    range
                ));
            }
            ui.separator();

            if self.needs_render {
                self.render(ctx);
            }

            if let Some(texture) = &self.texture {
                ui.add(
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                        .shrink_to_fit(),
                );
            }
        });

        if self.loading {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.init_logging()?;

    let (fetch_sender, mut fetch_receiver) = mpsc::channel::<()>(10);
    let (grid_sender, grid_receiver) = mpsc::channel::<Result<Grid>>(10);

    let client = SurfaceClient::new(config.api.clone());
    let _fetch_task = tokio::spawn(async move {
        while fetch_receiver.recv().await.is_some() {
            info!("Fetching surface for {}", client.config().symbol);
            let outcome = client.fetch_grid().await;
            if let Err(e) = &outcome {
                warn!("Error fetching surface: {}", e);
            }
            if grid_sender.send(outcome).await.is_err() {
                break;
            }
        }
    });

    let mut app = SurfaceViewerApp {
        fetch_sender,
        grid_receiver,
        status: String::new(),
        error: None,
        loading: false,
        grid: None,
        cache: MeshCache::default(),
        mesh: None,
        texture: None,
        layout: VertexLayout::Lattice,
        color_scale: ColorScale::RedGreen,
        yaw: 0.7,
        pitch: 0.45,
        needs_render: false,
    };
    app.set_grid(Grid::demo(DEMO_SIZE), "demo");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1250.0, 1050.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Volatility Surface Visualizer",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| {
        let err_msg = format!("Failed to start GUI: {}", e);
        warn!("{}", err_msg);
        VizError::Other(err_msg)
    })?;

    info!("shutting down");
    Ok(())
}
