//! path-probe: lädt ein Pfad-Dokument und gibt Länge und Abtastpunkte aus.

use anyhow::Result;
use bezier_path_engine::io::save_path_document;
use bezier_path_engine::{load_path_document, PathDocument, PathOptions, Ray};
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "path-probe", about, long_about = None)]
struct Args {
    /// JSON-Pfad-Dokument (`"kind": "curve"` oder `"kind": "spline"`)
    document: PathBuf,
    /// Optionen-Datei (TOML); ohne Angabe gelten die Werte aus dem Dokument
    #[arg(long, short)]
    options: Option<PathBuf>,
    /// Anzahl gleichmäßiger Abtastschritte
    #[arg(long, short, default_value_t = 10)]
    samples: u32,
    /// Spline nach Bogenlänge statt nach Parameter abtasten
    #[arg(long)]
    by_distance: bool,
    /// Nächsten Pfadpunkt zu dieser Position suchen
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    near: Option<Vec<f32>>,
    /// Strahl (Ursprung und Richtung) für die Strahl-Abfrage
    #[arg(long, num_args = 6, value_names = ["OX", "OY", "OZ", "DX", "DY", "DZ"], allow_negative_numbers = true)]
    ray: Option<Vec<f32>>,
    /// Spline: am Strahl-Treffer einen Anker einfügen und das Dokument hierhin schreiben
    #[arg(long, requires = "ray")]
    insert_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let mut document = load_path_document(&args.document)?;

    let options = args.options.as_deref().map(PathOptions::load_from_file);
    prepare(&mut document, options.as_ref());
    let query = options.unwrap_or_default().query;

    log::info!("Pfadlänge: {:.4}", document.length());

    let samples = args.samples.max(1);
    for i in 0..=samples {
        let t = i as f32 / samples as f32;
        let p = match (&document, args.by_distance) {
            (PathDocument::Spline(spline), true) => spline.pos_for_distance(t * spline.length()),
            _ => document.point_at(t),
        };
        println!("{:.4}\t{:.4}\t{:.4}\t{:.4}", t, p.x, p.y, p.z);
    }

    if let Some(near) = args.near.as_deref() {
        let target = Vec3::from_slice(near);
        let steps = query.closest_point_steps;
        let hit = match &document {
            PathDocument::Curve(curve) => curve.closest_point_to_point(target, steps),
            PathDocument::Spline(spline) => spline.closest_point_to_point(target, steps),
        };
        println!(
            "nearest\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
            hit.t, hit.position.x, hit.position.y, hit.position.z
        );
    }

    if let Some(values) = args.ray.as_deref() {
        let ray = Ray::new(Vec3::from_slice(&values[..3]), Vec3::from_slice(&values[3..]));
        let steps = query.closest_point_steps;
        let hit = match &document {
            PathDocument::Curve(curve) => curve.closest_point_to_ray(&ray, steps),
            PathDocument::Spline(spline) => spline.closest_point_to_ray(&ray, steps).closest,
        };
        println!(
            "ray\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
            hit.t, hit.position.x, hit.position.y, hit.position.z
        );

        if let Some(out) = args.insert_out.as_deref() {
            match &mut document {
                PathDocument::Spline(spline) => {
                    let index =
                        spline.insert_point_closest_to_ray(&ray, steps, query.ray_insert_handle_offset);
                    log::info!("Anker {} eingefügt", index);
                    save_path_document(out, &document)?;
                }
                PathDocument::Curve(_) => {
                    anyhow::bail!("Einfügen per Strahl ist nur für Splines möglich");
                }
            }
        }
    }

    Ok(())
}

/// Übernimmt die Optionen und bringt den abgeleiteten Zustand auf Stand.
fn prepare(document: &mut PathDocument, options: Option<&PathOptions>) {
    match document {
        PathDocument::Curve(curve) => {
            if let Some(opts) = options {
                curve.set_resolution(opts.curve.resolution);
                curve.set_auto_smooth(opts.curve.auto_smooth);
                curve.set_auto_smooth_factor(opts.curve.auto_smooth_factor);
            }
            curve.update();
        }
        PathDocument::Spline(spline) => {
            if let Some(opts) = options {
                spline.set_options(opts.spline);
            }
        }
    }
}
