// --- MatriculaUp: extracción de oferta y malla, choques de horario ---

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use matriculaup::config::Config;
use matriculaup::extraccion::documento::{
    PlanEstudios, guardar_json, leer_catalogo, leer_documento, nombre_archivo_cursos,
};
use matriculaup::extraccion::Estadisticas;
use matriculaup::extraccion::efe::{extraer_efe, nombre_archivo_efe};
use matriculaup::horario::Horario;
use matriculaup::server::EstadoServidor;
use matriculaup::{Result, api_json, detectar_ciclo, extraer_cursos, extraer_malla, run_server};

#[derive(Parser)]
#[command(name = "matriculaup", version, about = "Extrae la oferta académica y detecta choques de horario")]
struct Cli {
    #[command(subcommand)]
    comando: Comando,
}

#[derive(Subcommand)]
enum Comando {
    /// Extrae cursos, secciones y sesiones de un volcado de tablas (.json) o libro Excel
    Cursos {
        #[arg(long)]
        entrada: PathBuf,
        /// Ciclo académico (p. ej. 2026-1); por defecto se deduce del nombre del archivo
        #[arg(long)]
        ciclo: Option<String>,
        #[arg(long)]
        salida_dir: Option<PathBuf>,
    },
    /// Extrae los cursos EFE con la misma forma que la oferta regular
    Efe {
        #[arg(long)]
        entrada: PathBuf,
        #[arg(long)]
        ciclo: Option<String>,
        #[arg(long)]
        salida_dir: Option<PathBuf>,
    },
    /// Extrae la malla curricular agrupada por ciclo
    Malla {
        #[arg(long)]
        entrada: PathBuf,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        carrera: Option<String>,
        #[arg(long, default_value = "curricula_economia2017.json")]
        salida: String,
        #[arg(long)]
        salida_dir: Option<PathBuf>,
    },
    /// Evalúa una selección guardada contra un catálogo de cursos
    Conflictos {
        #[arg(long)]
        catalogo: PathBuf,
        #[arg(long)]
        seleccion: PathBuf,
    },
    /// Levanta la API HTTP
    Servir {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        catalogo: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filtro = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filtro).with_writer(std::io::stderr).init();
}

fn resumir(estadisticas: &Estadisticas, umbral: f64) -> ExitCode {
    let tasa = estadisticas.tasa_error() * 100.0;
    println!(
        "Filas procesadas: {}, advertencias: {} ({:.1}%)",
        estadisticas.filas_totales, estadisticas.errores, tasa
    );
    if estadisticas.supera_umbral(umbral) {
        eprintln!("ADVERTENCIA: tasa de error {:.1}% excede umbral {:.1}%", tasa, umbral * 100.0);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn cmd_cursos(cfg: &Config, entrada: &Path, ciclo: Option<String>, salida_dir: Option<PathBuf>) -> Result<ExitCode> {
    let documento = leer_documento(entrada)?;
    let ciclo = ciclo.unwrap_or_else(|| detectar_ciclo(&entrada.to_string_lossy()));
    let resultado = extraer_cursos(&documento, &ciclo, chrono::Local::now().date_naive(), cfg.umbral_error);
    let dir = salida_dir.unwrap_or_else(|| cfg.salida_dir.clone());
    let ruta = guardar_json(&resultado.documento, &dir, &nombre_archivo_cursos(&ciclo))?;
    println!("{}: {} cursos", ruta.display(), resultado.documento.cursos.len());
    Ok(resumir(&resultado.estadisticas, cfg.umbral_error))
}

fn cmd_efe(cfg: &Config, entrada: &Path, ciclo: Option<String>, salida_dir: Option<PathBuf>) -> Result<ExitCode> {
    let documento = leer_documento(entrada)?;
    let ciclo = ciclo.unwrap_or_else(|| detectar_ciclo(&entrada.to_string_lossy()));
    let resultado = extraer_efe(&documento, &ciclo, chrono::Local::now().date_naive(), cfg.umbral_error);
    let dir = salida_dir.unwrap_or_else(|| cfg.salida_dir.clone());
    let ruta = guardar_json(&resultado.documento, &dir, &nombre_archivo_efe(&ciclo))?;
    println!("{}: {} cursos EFE", ruta.display(), resultado.documento.cursos.len());
    Ok(resumir(&resultado.estadisticas, cfg.umbral_error))
}

fn cmd_malla(
    cfg: &Config,
    entrada: &Path,
    plan: Option<String>,
    carrera: Option<String>,
    salida: &str,
    salida_dir: Option<PathBuf>,
) -> Result<ExitCode> {
    let documento = leer_documento(entrada)?;
    let mut datos_plan = PlanEstudios::default();
    if let Some(p) = plan {
        datos_plan.plan = p;
    }
    if let Some(c) = carrera {
        datos_plan.carrera = c;
    }
    let resultado = extraer_malla(&documento, &datos_plan, chrono::Local::now().date_naive(), cfg.umbral_error);
    let dir = salida_dir.unwrap_or_else(|| cfg.salida_dir.clone());
    let ruta = guardar_json(&resultado.documento, &dir, salida)?;
    let total: usize = resultado.documento.ciclos.iter().map(|g| g.cursos.len()).sum();
    println!("{}: {} grupos, {} cursos", ruta.display(), resultado.documento.ciclos.len(), total);
    Ok(resumir(&resultado.estadisticas, cfg.umbral_error))
}

fn cmd_conflictos(catalogo: &Path, seleccion: &Path) -> Result<ExitCode> {
    let catalogo = leer_catalogo(catalogo)?.cursos;
    let texto = std::fs::read_to_string(seleccion).map_err(|e| matriculaup::MatriculaError::io(seleccion, e))?;
    let guardadas = api_json::parse_selecciones(&texto)?;
    let horario = Horario::desde_guardado(guardadas.clone(), &catalogo);
    if horario.selecciones().len() < guardadas.len() {
        warn!(
            descartadas = guardadas.len() - horario.selecciones().len(),
            "selecciones que ya no existen en el catálogo"
        );
    }

    let conflictos = horario.conflictos(&catalogo);
    println!("Créditos: {}", horario.creditos(&catalogo));
    if conflictos.is_empty() {
        println!("Sin choques de horario");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Conflictos en horario:");
    for (a, b) in &conflictos {
        println!("  • {} {} choca con {} {}", a.codigo, a.nombre, b.codigo, b.nombre);
    }
    Ok(ExitCode::from(2))
}

async fn cmd_servir(cfg: &Config, bind: Option<String>, catalogo: Option<PathBuf>) -> Result<ExitCode> {
    let bind = bind.unwrap_or_else(|| cfg.bind.clone());
    let cursos = match catalogo.or_else(|| cfg.catalogo.clone()) {
        Some(ruta) => leer_catalogo(&ruta)?.cursos,
        None => {
            warn!("sin catálogo: /cursos y /conflictos responderán vacío");
            Vec::new()
        }
    };
    let mut estado = EstadoServidor::new(cursos);
    estado.umbral_error = cfg.umbral_error;
    info!("Iniciando servidor en http://{}", bind);
    run_server(&bind, estado)
        .await
        .map_err(|e| matriculaup::MatriculaError::io(PathBuf::from(&bind), e))?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(3);
        }
    };

    let resultado = match cli.comando {
        Comando::Cursos { entrada, ciclo, salida_dir } => cmd_cursos(&cfg, &entrada, ciclo, salida_dir),
        Comando::Efe { entrada, ciclo, salida_dir } => cmd_efe(&cfg, &entrada, ciclo, salida_dir),
        Comando::Malla { entrada, plan, carrera, salida, salida_dir } => {
            cmd_malla(&cfg, &entrada, plan, carrera, &salida, salida_dir)
        }
        Comando::Conflictos { catalogo, seleccion } => cmd_conflictos(&catalogo, &seleccion),
        Comando::Servir { bind, catalogo } => cmd_servir(&cfg, bind, catalogo).await,
    };

    match resultado {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(3)
        }
    }
}
