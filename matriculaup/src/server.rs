use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::algorithm::buscar_cursos;
use crate::api_json::{CursoResumen, ExtraccionResponse, ExtraerCursosRequest, evaluar_horario, parse_selecciones};
use crate::config::UMBRAL_ERROR_POR_DEFECTO;
use crate::extraccion::documento::{detectar_ciclo, extraer_cursos};
use crate::extraccion::efe::extraer_efe;
use crate::models::Curso;

// volcados de tablas de un PDF completo superan el límite por defecto de 32 KiB
const LIMITE_JSON: usize = 16 * 1024 * 1024;

/// Catálogo cargado al arrancar; sólo lectura durante la vida del servidor.
#[derive(Debug, Clone)]
pub struct EstadoServidor {
    pub catalogo: Vec<Curso>,
    pub umbral_error: f64,
}

impl EstadoServidor {
    pub fn new(catalogo: Vec<Curso>) -> Self {
        EstadoServidor { catalogo, umbral_error: UMBRAL_ERROR_POR_DEFECTO }
    }
}

#[derive(Deserialize)]
struct BusquedaQuery {
    #[serde(default)]
    q: String,
}

/// GET /cursos?q=...
async fn cursos_handler(estado: web::Data<EstadoServidor>, query: web::Query<BusquedaQuery>) -> impl Responder {
    let resultados: Vec<CursoResumen> = buscar_cursos(&estado.catalogo, &query.q)
        .into_iter()
        .map(CursoResumen::from)
        .collect();
    HttpResponse::Ok().json(json!({"total": resultados.len(), "cursos": resultados}))
}

/// GET /cursos/{codigo}
async fn curso_handler(estado: web::Data<EstadoServidor>, codigo: web::Path<String>) -> impl Responder {
    match estado.catalogo.iter().find(|c| c.codigo == *codigo) {
        Some(curso) => HttpResponse::Ok().json(curso),
        None => HttpResponse::NotFound().json(json!({"error": format!("curso '{}' no encontrado", codigo)})),
    }
}

/// POST /conflictos
async fn conflictos_handler(estado: web::Data<EstadoServidor>, body: web::Json<serde_json::Value>) -> impl Responder {
    let json_str = match serde_json::to_string(&body.into_inner()) {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("invalid JSON body: {}", e)})),
    };
    let selecciones = match parse_selecciones(&json_str) {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("selecciones inválidas: {}", e)})),
    };
    HttpResponse::Ok().json(evaluar_horario(&estado.catalogo, &selecciones))
}

/// POST /extraer/cursos
async fn extraer_cursos_handler(
    estado: web::Data<EstadoServidor>,
    body: web::Json<ExtraerCursosRequest>,
) -> impl Responder {
    let req = body.into_inner();
    let ciclo = req
        .ciclo
        .clone()
        .unwrap_or_else(|| detectar_ciclo(req.documento.fuente.as_deref().unwrap_or_default()));
    let hoy = chrono::Local::now().date_naive();
    let resultado = extraer_cursos(&req.documento, &ciclo, hoy, estado.umbral_error);
    HttpResponse::Ok().json(ExtraccionResponse::new(
        resultado.documento,
        resultado.estadisticas,
        estado.umbral_error,
    ))
}

/// POST /extraer/efe
async fn extraer_efe_handler(
    estado: web::Data<EstadoServidor>,
    body: web::Json<ExtraerCursosRequest>,
) -> impl Responder {
    let req = body.into_inner();
    let ciclo = req
        .ciclo
        .clone()
        .unwrap_or_else(|| detectar_ciclo(req.documento.fuente.as_deref().unwrap_or_default()));
    let resultado = extraer_efe(&req.documento, &ciclo, chrono::Local::now().date_naive(), estado.umbral_error);
    HttpResponse::Ok().json(ExtraccionResponse::new(
        resultado.documento,
        resultado.estadisticas,
        estado.umbral_error,
    ))
}

async fn help_handler(estado: web::Data<EstadoServidor>) -> impl Responder {
    let help = json!({
        "description": "API de MatriculaUp: catálogo de cursos, choques de horario y extracción de tablas de oferta.",
        "cursos_en_catalogo": estado.catalogo.len(),
        "endpoints": {
            "GET /cursos?q=": "busca por código o nombre (sin tildes ni mayúsculas)",
            "GET /cursos/{codigo}": "curso completo con secciones y sesiones",
            "POST /conflictos": "evalúa una selección de secciones",
            "POST /extraer/cursos": "extrae cursos desde un volcado de tablas",
            "POST /extraer/efe": "extrae cursos EFE desde su volcado de tablas",
        },
        "post_conflictos_example": [
            {"course_code": "138201", "section_label": "A"},
            {"course_code": "166097", "section_label": "B"}
        ],
        "post_extraer_example": {
            "ciclo": "2026-1",
            "paginas": [{"tablas": [[["138201", "Microeconomia I", "4", null, null, null]]]}]
        }
    });
    HttpResponse::Ok().json(help)
}

/// Rutas de la API; separado de `run_server` para poder montarlas en tests.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(LIMITE_JSON))
        .route("/cursos", web::get().to(cursos_handler))
        .route("/cursos/{codigo}", web::get().to(curso_handler))
        .route("/conflictos", web::post().to(conflictos_handler))
        .route("/extraer/cursos", web::post().to(extraer_cursos_handler))
        .route("/extraer/efe", web::post().to(extraer_efe_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(bind_addr: &str, estado: EstadoServidor) -> std::io::Result<()> {
    info!(bind = bind_addr, cursos = estado.catalogo.len(), "iniciando servidor");
    let datos = web::Data::new(estado);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(datos.clone())
            .configure(configurar_rutas)
    })
    .bind(bind_addr)?
    .run()
    .await
}
