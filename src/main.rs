mod ui;

use clap::{ArgAction, Parser, Subcommand};
use console::style;
use docbleach::{
    BleachConfig, BleachRegistry, BleachSession, FileDigest, RequestHandler, SanitizeReport,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "docbleach", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
    /// Archivo JSON de configuración
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Aumenta el detalle del registro (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sanea un documento y escribe la versión limpia
    #[command(alias = "s")]
    Sanitize {
        input: PathBuf,
        output: PathBuf,
        /// Imprime el reporte en JSON
        #[arg(long)]
        json: bool,
    },
    /// Procesa un sobre JSON de petición e imprime la respuesta
    #[command(alias = "r")]
    Request { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(message) = run(cli) {
        eprintln!("{} {}", style("✗").red().bold(), style(message).red());
        process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("docbleach={}", level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => BleachConfig::load(path).map_err(|e| e.to_string())?,
        None => BleachConfig::default(),
    };

    match cli.command {
        Command::Sanitize {
            input,
            output,
            json,
        } => sanitize_file(&config, &input, &output, json),
        Command::Request { file } => handle_request_file(config, &file),
    }
}

fn sanitize_file(config: &BleachConfig, input: &Path, output: &Path, json: bool) -> Result<(), String> {
    let contents = fs::read(input)
        .map_err(|e| format!("No se pudo leer `{}`: {}", input.display(), e))?;

    let registry = BleachRegistry::from_config(config);
    let mut session = BleachSession::new();
    let mut sanitized = Vec::new();
    registry
        .sanitize_bytes(&contents, &mut sanitized, &mut session)
        .map_err(|e| format!("No se pudo sanear `{}`: {}", input.display(), e))?;

    write_atomically(output, &sanitized)?;

    let report = SanitizeReport::new(
        FileDigest::new(input.display().to_string(), &contents),
        FileDigest::new(output.display().to_string(), &sanitized),
        &session,
    );

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("No se pudo serializar el reporte: {}", e))?;
        println!("{}", rendered);
    } else {
        ui::render_header();
        ui::render_report(&report);
    }
    Ok(())
}

fn handle_request_file(config: BleachConfig, file: &Path) -> Result<(), String> {
    let body = fs::read_to_string(file)
        .map_err(|e| format!("No se pudo leer `{}`: {}", file.display(), e))?;

    let handler = RequestHandler::new(config);
    match handler.handle_to_json(&body) {
        Ok(response) => {
            println!("{}", response);
            Ok(())
        }
        Err(error) => Err(format!("{} (HTTP {})", error, error.status_code())),
    }
}

/// Escribe primero en un temporal junto al destino y luego lo renombra, para
/// que un fallo no deje una salida a medias.
fn write_atomically(path: &Path, data: &[u8]) -> Result<(), String> {
    let temp_path = generate_temp_filename(path);

    fs::write(&temp_path, data)
        .map_err(|e| format!("No se pudo crear archivo temporal: {}", e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        format!("No se pudo escribir `{}`: {}", path.display(), e)
    })
}

fn generate_temp_filename(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let extension = path.extension().unwrap_or_default().to_string_lossy();

    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    parent.join(format!(
        ".{}_bleach_{}_{}.{}",
        stem,
        process::id(),
        timestamp,
        extension
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn temp_file_lands_next_to_target() {
        let temp = generate_temp_filename(Path::new("/tmp/salida/informe.docx"));
        assert_eq!(temp.parent(), Some(Path::new("/tmp/salida")));
        let name = temp.file_name().unwrap_or_default().to_string_lossy();
        assert!(name.starts_with(".informe_bleach_"));
        assert!(name.ends_with(".docx"));
    }

    #[test]
    fn sanitize_file_copies_unknown_formats() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("notas.txt");
        let output = dir.path().join("notas_limpias.txt");
        fs::write(&input, b"solo texto")?;

        sanitize_file(&BleachConfig::default(), &input, &output, true)?;

        assert_eq!(fs::read(&output)?, b"solo texto");
        let leftovers = fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with('.'))
            .count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    fn cli_parses_global_flags() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from([
            "docbleach",
            "-vv",
            "sanitize",
            "entrada.docm",
            "salida.docx",
            "--config",
            "bleach.json",
        ])?;
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(Path::new("bleach.json")));
        assert!(matches!(cli.command, Command::Sanitize { json: false, .. }));
        Ok(())
    }
}
