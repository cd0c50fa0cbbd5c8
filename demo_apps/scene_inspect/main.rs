use std::path::PathBuf;

use anyhow::{Context, bail};
use kiln::prelude::*;

const USAGE: &str = "usage: scene_inspect <file.pbrt|file.ply> [--settings settings.json]";

fn parse_args() -> anyhow::Result<(PathBuf, Option<PathBuf>)> {
    let mut args = std::env::args().skip(1);
    let mut scene = None;
    let mut settings = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let path = args.next().context("--settings needs a file")?;
                settings = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if scene.is_none() => scene = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }

    let scene = scene.context(USAGE)?;
    Ok((scene, settings))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. 参数与配置
    let (scene_path, settings_path) = parse_args()?;
    let settings = match settings_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<ImportSettings>(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ImportSettings::default(),
    };
    log::debug!("Settings: {settings:?}");

    // 2. 导入
    let report = Importer::new(FileSource).with_settings(settings).import(&scene_path);

    for diagnostic in &report.diagnostics {
        log::warn!("{diagnostic}");
    }

    // 3. 输出摘要
    let scene = &report.scene;
    for (handle, mesh) in scene.meshes() {
        let streams: Vec<_> = mesh.data_streams().map(|s| format!("{:?}", s.semantic())).collect();
        let name = if mesh.name.is_empty() { "<unnamed>" } else { mesh.name.as_str() };
        log::info!(
            "mesh {handle:?} {name}: {} triangles, streams [{}], {} sub-meshes, parent {:?}",
            mesh.num_triangles(),
            streams.join(", "),
            mesh.sub_meshes().len(),
            mesh.parent()
        );
        if let Err(err) = mesh.validate() {
            log::error!("mesh {handle:?} is inconsistent: {err}");
        }
    }
    for (handle, material) in scene.materials() {
        let properties: Vec<_> = material.properties().iter().map(|p| format!("{}={}", p.name, p.value)).collect();
        log::info!("material {handle:?} '{}': {}", material.name, properties.join(" "));
    }

    if let Some(err) = report.failure {
        return Err(err).with_context(|| format!("importing {}", scene_path.display()));
    }
    Ok(())
}
