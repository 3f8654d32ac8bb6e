use crate::error::{Result, VizError};
use crate::models::Mesh;
use crate::utils::color::ColorScale;
use image::{ImageFormat, RgbImage};
use plotters::backend::BitMapBackend;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Camera and canvas settings for surface rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Rotation around the vertical axis, radians
    pub yaw: f64,
    /// Tilt towards the viewer, radians
    pub pitch: f64,
    pub scale: f64,
    /// Gradient drawn in the color bar; should match the mesh colors
    pub color_scale: ColorScale,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            title: "Volatility Surface".to_string(),
            yaw: 0.7,
            pitch: 0.45,
            scale: 0.8,
            color_scale: ColorScale::RedGreen,
        }
    }
}

/// A filled triangle in chart coordinates: (maturity, volatility, delta).
pub type SurfacePolygon = (Vec<(f64, f64, f64)>, RGBColor);

/// Render the mesh and write it to `output_path` as PNG
pub fn render_mesh<P: AsRef<Path>>(mesh: &Mesh, output_path: P, opts: &RenderOptions) -> Result<()> {
    let output_path = output_path.as_ref();

    let img = render_mesh_in_memory(mesh, opts)?;
    img.save_with_format(output_path, ImageFormat::Png)?;

    Ok(())
}

/// 3D view of the colored surface: maturity across, volatility up, delta deep
pub fn render_mesh_in_memory(mesh: &Mesh, opts: &RenderOptions) -> Result<RgbImage> {
    let (width, height) = (opts.width, opts.height);
    let polygons = surface_polygons(mesh);

    let x_range = axis_range(mesh.positions().map(|p| p[0] as f64));
    let z_range = axis_range(mesh.positions().map(|p| p[1] as f64));
    let vol_range = match mesh.bounds {
        Some(b) => axis_range([b.min, b.max].into_iter()),
        None => axis_range(mesh.positions().map(|p| p[2] as f64)),
    };

    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&opts.title, ("sans-serif", 30).into_font())
            .margin(20)
            .build_cartesian_3d(x_range, vol_range, z_range)
            .map_err(render_err)?;

        chart.with_projection(|mut pb| {
            pb.yaw = opts.yaw;
            pb.pitch = opts.pitch;
            pb.scale = opts.scale;
            pb.into_matrix()
        });

        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.15))
            .max_light_lines(3)
            .draw()
            .map_err(render_err)?;

        if polygons.is_empty() {
            debug!("nothing to triangulate, drawing axes only");
        } else {
            chart
                .draw_series(
                    polygons
                        .into_iter()
                        .map(|(points, color)| Polygon::new(points, color.filled())),
                )
                .map_err(render_err)?;
        }

        let color_bar_width = 20;
        let color_bar_height = (height / 2) as i32;
        let color_bar_x = width as i32 - 90;
        let color_bar_y = 100;

        for i in 0..color_bar_height {
            let normalized_pos = 1.0 - (i as f64 / color_bar_height as f64);
            let rgb = to_rgb(opts.color_scale.rgb(normalized_pos));

            root.draw(&Rectangle::new(
                [
                    (color_bar_x, color_bar_y + i),
                    (color_bar_x + color_bar_width, color_bar_y + i + 1),
                ],
                rgb.filled(),
            ))
            .map_err(render_err)?;
        }

        let label_style = TextStyle::from(("sans-serif", 12)).color(&BLACK);
        if let Some(bounds) = mesh.bounds {
            root.draw_text(
                &format!("{:.2}", bounds.max),
                &label_style,
                (color_bar_x + color_bar_width + 5, color_bar_y),
            )
            .map_err(render_err)?;

            root.draw_text(
                &format!("{:.2}", bounds.min),
                &label_style,
                (
                    color_bar_x + color_bar_width + 5,
                    color_bar_y + color_bar_height,
                ),
            )
            .map_err(render_err)?;
        }

        root.draw_text(
            "IV",
            &label_style,
            (
                color_bar_x + color_bar_width + 5,
                color_bar_y + color_bar_height / 2,
            ),
        )
        .map_err(render_err)?;

        root.draw_text(
            &format!(
                "x: maturity  y: volatility  z: delta    Generated: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ),
            &TextStyle::from(("sans-serif", 15)).color(&BLACK),
            (10, height as i32 - 25),
        )
        .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| VizError::RenderError("pixel buffer does not match image size".to_string()))
}

/// One polygon per triangle, colored with the mean of its vertex colors.
///
/// Indices are lattice positions and are resolved through the mesh layout.
/// Triangles that touch a point the mesh did not emit are dropped.
pub fn surface_polygons(mesh: &Mesh) -> Vec<SurfacePolygon> {
    let mut polygons = Vec::with_capacity(mesh.triangle_count());
    let mut skipped = 0usize;

    'triangles: for tri in mesh.triangles() {
        let mut points = Vec::with_capacity(3);
        let mut color = [0.0f32; 3];
        for idx in tri {
            let Some((p, c)) = mesh.lattice_vertex(idx) else {
                skipped += 1;
                continue 'triangles;
            };
            points.push((p[0] as f64, p[2] as f64, p[1] as f64));
            for (sum, v) in color.iter_mut().zip(c) {
                *sum += v;
            }
        }
        polygons.push((points, to_rgb(color.map(|sum| sum / 3.0))));
    }

    if skipped > 0 {
        debug!(skipped, "dropped triangles without emitted vertices");
    }
    polygons
}

fn axis_range<I: Iterator<Item = f64>>(values: I) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    let span = max - min;
    if span == 0.0 {
        return (min - 0.5)..(max + 0.5);
    }
    (min - 0.05 * span)..(max + 0.05 * span)
}

fn to_rgb(c: [f32; 3]) -> RGBColor {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(channel(c[0]), channel(c[1]), channel(c[2]))
}

fn render_err<E: std::fmt::Display>(e: E) -> VizError {
    VizError::RenderError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grid, VertexLayout};
    use crate::utils::mesh_builder::{build_mesh, MeshBuilder};

    fn two_by_two() -> Grid {
        Grid::from_rows(
            &[vec![0.0, 1.0], vec![0.0, 1.0]],
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            &[vec![5.0, 6.0], vec![8.0, 9.0]],
        )
        .unwrap()
    }

    #[test]
    fn lattice_mesh_yields_every_triangle() {
        let mesh = build_mesh(&Grid::demo(5));
        assert_eq!(surface_polygons(&mesh).len(), mesh.triangle_count());
    }

    #[test]
    fn polygons_put_volatility_on_vertical_axis() {
        let polygons = surface_polygons(&build_mesh(&two_by_two()));
        let (points, _) = &polygons[0];
        assert_eq!(points[0], (0.0, 5.0, 0.0));
        assert_eq!(points[1], (1.0, 6.0, 0.0));
        assert_eq!(points[2], (0.0, 8.0, 1.0));
    }

    #[test]
    fn polygon_color_is_vertex_mean() {
        let polygons = surface_polygons(&build_mesh(&two_by_two()));
        // t = 0, 0.25, 0.75 for the first triangle
        let RGBColor(r, g, b) = polygons[0].1;
        assert_eq!((r, g, b), (85, 170, 128));
    }

    #[test]
    fn cell_layout_drops_dangling_triangles() {
        let mesh = MeshBuilder::new()
            .layout(VertexLayout::Cell)
            .build(&two_by_two());
        assert!(surface_polygons(&mesh).is_empty());
    }

    #[test]
    fn cell_layout_draws_lattice_points() {
        let grid = Grid::demo(4);
        let cols = grid.cols();
        let mesh = MeshBuilder::new().layout(VertexLayout::Cell).build(&grid);
        let polygons = surface_polygons(&mesh);

        // only cells whose four corners are all emitted survive
        assert_eq!(polygons.len(), 8);

        let expected = |idx: u32| {
            let (i, j) = (idx as usize / cols, idx as usize % cols);
            let f = |v: f64| v as f32 as f64;
            (f(grid.x()[[i, j]]), f(grid.vol()[[i, j]]), f(grid.y()[[i, j]]))
        };
        let drawn = mesh
            .triangles()
            .filter(|tri| tri.iter().all(|&idx| mesh.vertex_slot(idx).is_some()));
        for ((points, _), tri) in polygons.iter().zip(drawn) {
            let want: Vec<_> = tri.iter().map(|&idx| expected(idx)).collect();
            assert_eq!(points, &want);
        }
    }

    #[test]
    fn cell_and_lattice_agree_on_shared_triangles() {
        let grid = Grid::demo(6);
        let lattice = surface_polygons(&build_mesh(&grid));
        let cell = surface_polygons(&MeshBuilder::new().layout(VertexLayout::Cell).build(&grid));
        for (points, _) in &cell {
            assert!(lattice.iter().any(|(p, _)| p == points));
        }
    }

    #[test]
    fn renders_image_of_requested_size() {
        let opts = RenderOptions {
            width: 400,
            height: 300,
            ..RenderOptions::default()
        };
        for size in [1, 10] {
            let img = render_mesh_in_memory(&build_mesh(&Grid::demo(size)), &opts).unwrap();
            assert_eq!(img.dimensions(), (400, 300));
        }
    }

    #[test]
    fn renders_empty_cell_mesh() {
        let mesh = MeshBuilder::new()
            .layout(VertexLayout::Cell)
            .build(&two_by_two());
        let opts = RenderOptions {
            width: 320,
            height: 240,
            ..RenderOptions::default()
        };
        let img = render_mesh_in_memory(&mesh, &opts).unwrap();
        assert_eq!(img.dimensions(), (320, 240));
    }

    #[test]
    fn axis_range_pads_and_handles_degenerate_input() {
        assert_eq!(axis_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(axis_range([2.0, 2.0].into_iter()), 1.5..2.5);
        let r = axis_range([0.0, 10.0].into_iter());
        assert_eq!(r, -0.5..10.5);
    }

    #[test]
    fn colors_convert_to_bytes() {
        assert_eq!(to_rgb([0.0, 1.0, 0.5]), RGBColor(0, 255, 128));
        assert_eq!(to_rgb([1.5, -0.2, 0.0]), RGBColor(255, 0, 0));
    }
}
