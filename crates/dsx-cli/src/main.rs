//! `dsx-inspect`: load a DSX document and print what the loader made of it.
//!
//! ```text
//! dsx-inspect <file> [--options opts.json] [--frames N] [--step MS] [--cycle-materials]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use dsx_core::{LoadOptions, Severity};
use dsx_graph::{load_file, DrawCall, Scene};
use dsx_shapes::Tiling;

const USAGE: &str = "usage: dsx-inspect <file> [--options opts.json] [--frames N] [--step MS] [--cycle-materials]";

#[derive(Debug)]
struct Args {
    file: PathBuf,
    options: Option<PathBuf>,
    frames: u32,
    step_ms: f32,
    cycle_materials: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut file = None;
    let mut parsed = Args {
        file: PathBuf::new(),
        options: None,
        frames: 1,
        step_ms: 16.0,
        cycle_materials: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--options" => parsed.options = Some(PathBuf::from(value(&mut args, "--options")?)),
            "--frames" => {
                parsed.frames = value(&mut args, "--frames")?
                    .parse()
                    .context("--frames expects a whole number")?
            }
            "--step" => {
                parsed.step_ms = value(&mut args, "--step")?
                    .parse()
                    .context("--step expects milliseconds")?
            }
            "--cycle-materials" => parsed.cycle_materials = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            path if file.is_none() => file = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {extra}\n{USAGE}"),
        }
    }

    parsed.file = file.context(USAGE)?;
    Ok(parsed)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().with_context(|| format!("{flag} needs a value"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let options = match &args.options {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            LoadOptions::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => LoadOptions::default(),
    };

    let mut scene = load_file(&args.file, &options).with_context(|| format!("loading {}", args.file.display()))?;
    print_summary(&scene)?;

    for frame in 0..args.frames {
        if frame > 0 {
            scene.graph.update(args.step_ms);
            if args.cycle_materials {
                scene.graph.cycle_materials();
            }
        }
        print_frame(&scene, frame);
    }
    Ok(())
}

fn print_summary(scene: &Scene) -> Result<()> {
    let diagnostics = &scene.diagnostics;
    println!("diagnostics: {} entries", diagnostics.len());
    for diagnostic in diagnostics.iter().filter(|d| d.severity > Severity::Info) {
        println!("  {diagnostic}");
    }

    println!("scene: root '{}', axis length {}", scene.info.root, scene.info.axis_length);

    println!("views ({}):", scene.views.len());
    for (id, view) in scene.views.iter() {
        let marker = if scene.default_view.as_deref() == Some(id) { "*" } else { " " };
        println!("  {marker} {id}: {}", serde_json::to_string(view)?);
    }

    println!("lights ({}):", scene.lights.len());
    for (id, light) in scene.lights.iter() {
        let state = if light.enabled() { "on" } else { "off" };
        println!("    {id} [{state}] at {:?}", light.location());
    }

    let graph = &scene.graph;
    let leaves = graph.nodes().filter(|(_, node)| node.is_leaf()).count();
    println!(
        "graph: {} nodes ({} leaves), {} materials, {} textures",
        graph.len(),
        leaves,
        graph.materials().len(),
        graph.textures().len()
    );

    let mut triangles = 0;
    let stats = graph.traverse(&mut |call: &DrawCall<'_>| {
        let tiling = call.texture.map_or(Tiling::default(), |binding| binding.tiling);
        triangles += call.shape.tessellate(tiling).triangle_count();
    });
    println!(
        "traversal: {} visits, {} draws, {} triangles, {} cycles skipped, {} depth cuts",
        stats.visits, stats.draws, triangles, stats.cycles_skipped, stats.depth_cuts
    );
    Ok(())
}

fn print_frame(scene: &Scene, frame: u32) {
    println!("frame {frame}:");
    scene.graph.traverse(&mut |call: &DrawCall<'_>| {
        let position = call.transform.w_axis.truncate();
        let texture = call.texture.map_or("-", |binding| binding.id);
        println!(
            "  {:<16} {:<10} material={:<10} texture={:<10} at ({:.2}, {:.2}, {:.2})",
            call.node,
            call.shape.kind_name(),
            call.material_id.unwrap_or("-"),
            texture,
            position.x,
            position.y,
            position.z
        );
    });
}
